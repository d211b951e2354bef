//! Field escaping for the text format.
//!
//! Structural characters inside a field are written as `\` followed by the
//! character. Everything else is copied verbatim.

use std::borrow::Cow;

pub const ESCAPE: u8 = b'\\';

/// Characters escaped inside a field on encode. Decode also accepts raw braces.
pub const DELIMITERS: &[u8] = b"\\,;[]{}";

pub fn needs_escape(byte: u8) -> bool {
    DELIMITERS.contains(&byte)
}

/// Append `field` to `out`, escaping delimiters.
pub fn escape_into(field: &str, out: &mut String) {
    for ch in field.chars() {
        if ch.is_ascii() && needs_escape(ch as u8) {
            out.push(ESCAPE as char);
        }
        out.push(ch);
    }
}

/// Escaped copy of `field`, borrowed when nothing needs escaping.
pub fn escape(field: &str) -> Cow<'_, str> {
    if !field.bytes().any(needs_escape) {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len() + 4);
    escape_into(field, &mut out);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_borrowed() {
        assert!(matches!(escape("alice"), Cow::Borrowed("alice")));
        assert!(matches!(escape("1.0.0.0"), Cow::Borrowed(_)));
    }

    #[test]
    fn delimiters_are_escaped() {
        assert_eq!(escape("a,b;c"), r"a\,b\;c");
        assert_eq!(escape("[x]"), r"\[x\]");
        assert_eq!(escape("{}"), r"\{\}");
        assert_eq!(escape(r"back\slash"), r"back\\slash");
    }

    #[test]
    fn non_ascii_is_untouched() {
        assert_eq!(escape("héllo, wörld"), r"héllo\, wörld");
    }
}
