//! Escaping of the three markup-reserved characters for plist embedding.

use memchr::memchr3;
use std::borrow::Cow;

/// Replaces `<`, `>` and `&` with their entity forms.
///
/// Single left-to-right pass, so an ampersand introduced by an earlier
/// substitution is never escaped again. Everything else, non-ASCII included,
/// passes through unchanged. Returns a borrow when no reserved character is
/// present, which is the overwhelmingly common case for this dataset.
pub fn escape(raw: &str) -> Cow<'_, str> {
    let Some(first) = memchr3(b'<', b'>', b'&', raw.as_bytes()) else {
        return Cow::Borrowed(raw);
    };

    let mut out = String::with_capacity(raw.len() + 8);
    out.push_str(&raw[..first]);
    for ch in raw[first..].chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
