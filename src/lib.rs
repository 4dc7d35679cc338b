// src/lib.rs
//
// ljclean — LiveJournal tag cleaner
//
// - <lj-cut ...>             : removed, attributes included. A '>' inside a quoted
//                              attribute value does not end the tag.
// - </lj...>                 : removed up to and including the next '>'.
// - <lj ... user="name" ...> : replaced by <span class="uname">name</span>. Dropped
//                              without a trace when there is no user attribute or
//                              its value is empty.
// - Everything else is copied through byte-for-byte.
// - An unterminated tag drops the rest of the input, starting at the tag.
// - Tag names and the `user` attribute match ASCII case-insensitively.
// - UTF-8 safe: every delimiter the scanner stops on is ASCII, so slicing at
//   those offsets always lands on a char boundary.

mod escape;

use log::{debug, trace};
use memchr::memchr;
use std::borrow::Cow;
use std::ops::Range;

/// Rewriting options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Entity-escape `& < > " '` in user names before emitting them.
    /// Off by default: names are copied verbatim.
    pub escape_user_names: bool,
}

/// Rewrite `<lj>`-family tags in `src` with default [`Options`].
///
/// Returns `src` itself, borrowed, when it contains no `<lj` in any case.
pub fn transform(src: &str) -> Cow<'_, str> {
    transform_with(src, &Options::default())
}

/// Rewrite `<lj>`-family tags in `src`.
pub fn transform_with<'a>(src: &'a str, options: &Options) -> Cow<'a, str> {
    if find_ignore_ascii_case(src.as_bytes(), 0, OPEN).is_none() {
        return Cow::Borrowed(src);
    }
    let mut out = String::with_capacity(src.len());
    rewrite(src, &mut out, options);
    Cow::Owned(out)
}

/* =============================== Core sets =============================== */

const OPEN: &[u8] = b"<lj";
const CLOSE: &[u8] = b"</lj";
const CUT: &[u8] = b"<lj-cut";

const SPAN_OPEN: &str = "<span class=\"uname\">";
const SPAN_CLOSE: &str = "</span>";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TagKind {
    Open,
    Cut,
    Close,
}

/* ============================ Utility predicates ========================= */

#[inline]
fn starts_with_ignore_ascii_case(s: &[u8], prefix: &[u8]) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Letters proper. Letter numbers such as `Ⅻ` count as alphabetic for
/// `char`, but not as letters here.
#[inline]
fn is_letter(c: char) -> bool {
    c.is_alphabetic() && !c.is_numeric()
}

/// `²`, `½` and the like are numeric but not digits; they end a name.
#[inline]
fn is_name_char(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

#[inline]
fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// Next case-insensitive `needle` at or after `from`. `needle[0]` must not be a letter.
fn find_ignore_ascii_case(s: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let mut i = from;
    while i < s.len() {
        let pos = i + memchr(needle[0], &s[i..])?;
        if starts_with_ignore_ascii_case(&s[pos..], needle) {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}

/// Locate the next tag of interest at or after `from`.
///
/// The forward scan returns whichever of `</lj` and `<lj` starts first. The two
/// prefixes can never start at the same offset.
fn find_next_tag(s: &[u8], from: usize) -> Option<(usize, TagKind)> {
    let mut i = from;
    while i < s.len() {
        let pos = i + memchr(b'<', &s[i..])?;
        let rest = &s[pos..];
        if starts_with_ignore_ascii_case(rest, CLOSE) {
            return Some((pos, TagKind::Close));
        }
        if starts_with_ignore_ascii_case(rest, CUT) {
            return Some((pos, TagKind::Cut));
        }
        if starts_with_ignore_ascii_case(rest, OPEN) {
            return Some((pos, TagKind::Open));
        }
        i = pos + 1;
    }
    None
}

/* ================================ Tokens ================================= */

/// `s[i]` is a quote. Returns the span of the quoted value and the offset just
/// past the closing quote, or `s.len()` when the value runs to end of input.
fn read_quoted(s: &[u8], i: usize) -> (Range<usize>, usize) {
    let start = i + 1;
    match memchr(s[i], &s[start..]) {
        Some(off) => (start..start + off, start + off + 1),
        None => (start..s.len(), s.len()),
    }
}

/// Run of letters/digits starting at `i`. The terminating char is not consumed.
fn read_name(src: &str, i: usize) -> (&str, usize) {
    let end = src[i..]
        .char_indices()
        .find(|&(_, c)| !is_name_char(c))
        .map_or(src.len(), |(off, _)| i + off);
    (&src[i..end], end)
}

fn skip_whitespace(src: &str, i: usize) -> usize {
    src[i..]
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(src.len(), |(off, _)| i + off)
}

/* ================================ Tags =================================== */

/// `s[i..]` starts with `</lj`. Returns the offset past the next '>'.
fn skip_close_tag(s: &[u8], i: usize) -> usize {
    let from = i + CLOSE.len();
    memchr(b'>', &s[from..]).map_or(s.len(), |off| from + off + 1)
}

/// `s[i..]` starts with `<lj-cut`. Returns the offset past its '>', stepping
/// over quoted values whole.
fn skip_cut_tag(s: &[u8], i: usize) -> usize {
    let mut j = i + CUT.len();
    while j < s.len() {
        match s[j] {
            b'>' => return j + 1,
            q if is_quote(q) => j = read_quoted(s, j).1,
            _ => j += 1,
        }
    }
    s.len()
}

/// `src[i..]` starts with `<lj`. Scans to the closing '>' and picks up the
/// quoted value of a `user` attribute, if any.
///
/// Returns `None` when input ends before '>'.
fn scan_user_tag(src: &str, i: usize) -> Option<(usize, Option<&str>)> {
    let s = src.as_bytes();
    let mut j = skip_whitespace(src, i + OPEN.len());

    let mut in_user = false;
    let mut awaiting_value = false;
    let mut user = None;

    loop {
        let ch = src[j..].chars().next()?;
        match ch {
            '>' => return Some((j + 1, user)),
            '"' | '\'' => {
                let (value, next) = read_quoted(s, j);
                if awaiting_value {
                    user = Some(&src[value]);
                    in_user = false;
                    awaiting_value = false;
                }
                j = next;
            }
            '=' if in_user => {
                awaiting_value = true;
                j += 1;
            }
            c if is_letter(c) => {
                let (name, next) = read_name(src, j);
                if name.eq_ignore_ascii_case("user") {
                    in_user = true;
                }
                j = next;
            }
            c => j += c.len_utf8(),
        }
    }
}

fn push_user_span(out: &mut String, name: &str, options: &Options) {
    out.push_str(SPAN_OPEN);
    if options.escape_user_names {
        escape::push_escaped(out, name);
    } else {
        out.push_str(name);
    }
    out.push_str(SPAN_CLOSE);
}

/* ============================== Transform =============================== */

fn rewrite(src: &str, out: &mut String, options: &Options) {
    let s = src.as_bytes();
    let n = s.len();
    let mut i = 0usize;

    while i < n {
        let Some((start, kind)) = find_next_tag(s, i) else {
            out.push_str(&src[i..]);
            return;
        };
        out.push_str(&src[i..start]);

        i = match kind {
            TagKind::Close => skip_close_tag(s, start),
            TagKind::Cut => skip_cut_tag(s, start),
            TagKind::Open => {
                let Some((end, user)) = scan_user_tag(src, start) else {
                    debug!(
                        "unterminated <lj> tag at byte {start}; dropping {} trailing bytes",
                        n - start
                    );
                    return;
                };
                match user {
                    Some(name) if !name.is_empty() => {
                        trace!("user tag at byte {start} -> {name:?}");
                        push_user_span(out, name, options);
                    }
                    _ => trace!("user tag at byte {start} has no user name; dropped"),
                }
                end
            }
        };
    }
}
