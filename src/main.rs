// src/main.rs
//
// ljclean — strip LiveJournal <lj>/<lj-cut> markup from an exported post
//
// CLI flags:
//   --escape-user-names : entity-escape user names placed in <span class="uname">
//
// INPUT may be `-` for stdin. Without OUTPUT the result goes to stdout.
// Logging goes to stderr; set RUST_LOG=debug to see dropped truncated tags.

use clap::{ArgAction, Parser};
use ljclean::{transform_with, Options};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Entity-escape user names instead of copying them verbatim
    #[arg(long = "escape-user-names", action = ArgAction::SetTrue)]
    escape_user_names: bool,

    /// Input file, or `-` for stdin
    input: PathBuf,

    /// Output file (default: stdout)
    output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    NotUtf8 {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let src = read_input(&cli.input)?;
    let options = Options {
        escape_user_names: cli.escape_user_names,
    };
    let out = transform_with(&src, &options);
    log::debug!(
        "{}: {} bytes in, {} bytes out",
        cli.input.display(),
        src.len(),
        out.len()
    );

    match &cli.output {
        Some(path) => fs::write(path, out.as_bytes()).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        }),
        None => write_stdout(out.as_bytes()),
    }
}

fn read_input(path: &Path) -> Result<String, Error> {
    let read_err = |source: io::Error| Error::Read {
        path: path.to_path_buf(),
        source,
    };
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf).map_err(read_err)?;
        buf
    } else {
        fs::read(path).map_err(read_err)?
    };
    String::from_utf8(bytes).map_err(|source| Error::NotUtf8 {
        path: path.to_path_buf(),
        source,
    })
}

fn write_stdout(bytes: &[u8]) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|source| Error::Write {
            path: PathBuf::from("-"),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn parses_flags_and_paths() {
        let cli = Cli::parse_from(["ljclean", "--escape-user-names", "in.html", "out.html"]);
        assert!(cli.escape_user_names);
        assert_eq!(cli.input, PathBuf::from("in.html"));
        assert_eq!(cli.output, Some(PathBuf::from("out.html")));

        let cli = Cli::parse_from(["ljclean", "-"]);
        assert!(!cli.escape_user_names);
        assert_eq!(cli.output, None);
    }

    #[test]
    fn missing_input_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = read_input(&dir.path().join("missing.html")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().starts_with("failed to read "));
    }

    #[test]
    fn non_utf8_input_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.html");
        fs::write(&path, [b'a', 0xff, b'b']).unwrap();
        let err = read_input(&path).unwrap_err();
        assert!(matches!(err, Error::NotUtf8 { .. }));
    }

    #[test]
    fn run_writes_cleaned_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("post.html");
        let output = dir.path().join("post.clean.html");
        fs::write(&input, "a<lj-cut>b</lj-cut><lj user='x&y'>").unwrap();

        let cli = Cli {
            escape_user_names: true,
            input,
            output: Some(output.clone()),
        };
        run(&cli).unwrap();
        let written = fs::read_to_string(&output).unwrap();

        assert_eq!(written, "ab<span class=\"uname\">x&amp;y</span>");
    }
}
