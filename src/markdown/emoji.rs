//! `:shortcode:` emoji, as GitHub-flavored editors write them.

use std::borrow::Cow;

/// Looks up a gemoji shortcode such as `rocket` or `+1`.
pub fn lookup(name: &str) -> Option<&'static str> {
    emojis::get_by_shortcode(name).map(|emoji| emoji.as_str())
}

fn is_shortcode_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')
}

/// Replaces known `:name:` shortcodes. Unknown names are left alone.
pub fn replace_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(open) = rest.find(':') {
        let after = &rest[open + 1..];
        let name_len = after.find(|c: char| !is_shortcode_char(c)).unwrap_or(after.len());
        let name = &after[..name_len];
        let closed = after[name_len..].starts_with(':');

        match lookup(name).filter(|_| closed && !name.is_empty()) {
            Some(emoji) => {
                out.push_str(&rest[..open]);
                out.push_str(emoji);
                rest = &after[name_len + 1..];
                replaced = true;
            }
            None => {
                // keep the colon; the closing one may open the next code
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if replaced {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_codes() {
        assert_eq!(replace_shortcodes("ship it :rocket: :tada:"), "ship it 🚀 🎉");
        assert_eq!(replace_shortcodes(":+1:"), "👍");
    }

    #[test]
    fn covers_the_full_shortcode_set() {
        assert_eq!(lookup("octopus"), Some("🐙"));
        assert_eq!(lookup("thumbsup"), lookup("+1"));
        assert_eq!(lookup("not_an_emoji"), None);
    }

    #[test]
    fn leaves_unknown_and_unclosed_codes() {
        assert_eq!(replace_shortcodes("a :nope: b"), "a :nope: b");
        assert_eq!(replace_shortcodes("time 10:30"), "time 10:30");
        assert_eq!(replace_shortcodes(":smile"), ":smile");
    }

    #[test]
    fn adjacent_colons_do_not_swallow_codes() {
        assert_eq!(replace_shortcodes("note::smile:"), "note:😄");
    }

    #[test]
    fn borrows_when_nothing_changes() {
        assert!(matches!(replace_shortcodes("plain"), Cow::Borrowed(_)));
        assert!(matches!(replace_shortcodes("a: b"), Cow::Borrowed(_)));
    }
}
