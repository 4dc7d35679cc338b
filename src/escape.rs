// src/escape.rs
//
// HTML escaping for captured user names, used only when
// `Options::escape_user_names` is set.

/// Append `s` to `out`, replacing `& < > " '` with entity references.
pub(crate) fn push_escaped(out: &mut String, s: &str) {
    let mut start = 0usize;
    for (i, ch) in s.char_indices() {
        let entity = match ch {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&s[start..i]);
        out.push_str(entity);
        start = i + 1;
    }
    out.push_str(&s[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        push_escaped(&mut out, s);
        out
    }

    #[test]
    fn plain_names_untouched() {
        assert_eq!(escaped("alice"), "alice");
        assert_eq!(escaped("ёлка_42"), "ёлка_42");
        assert_eq!(escaped(""), "");
    }

    #[test]
    fn markup_characters_become_entities() {
        assert_eq!(
            escaped(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn appends_rather_than_replaces() {
        let mut out = String::from("pre:");
        push_escaped(&mut out, "a&b");
        assert_eq!(out, "pre:a&amp;b");
    }
}
