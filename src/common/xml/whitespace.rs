//! Reversible marker for whitespace-only text.
//!
//! Whitespace-only content of `w:t`/`w:delText` is wrapped in
//! [`WHITESPACE_PLACEHOLDER`] at parse time so that trimming elsewhere in the
//! pipeline cannot collapse it. The serializer removes the marker exactly
//! once.
use memchr::memmem;
use std::borrow::Cow;

/// Token wrapped around whitespace-only text runs.
pub const WHITESPACE_PLACEHOLDER: &str = "[[sdspace]]";

/// Whether `s` is non-empty and consists only of XML whitespace.
#[inline]
pub fn is_whitespace_only(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

/// Wrap whitespace-only text in the placeholder; other text is returned as-is.
pub fn protect(s: &str) -> Cow<'_, str> {
    if is_whitespace_only(s) {
        let mut out = String::with_capacity(s.len() + 2 * WHITESPACE_PLACEHOLDER.len());
        out.push_str(WHITESPACE_PLACEHOLDER);
        out.push_str(s);
        out.push_str(WHITESPACE_PLACEHOLDER);
        Cow::Owned(out)
    } else {
        Cow::Borrowed(s)
    }
}

/// Remove every placeholder token from `s`.
pub fn strip(s: &str) -> Cow<'_, str> {
    let finder = memmem::Finder::new(WHITESPACE_PLACEHOLDER);
    if finder.find(s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for pos in finder.find_iter(s.as_bytes()) {
        out.push_str(&s[last..pos]);
        last = pos + WHITESPACE_PLACEHOLDER.len();
    }
    out.push_str(&s[last..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_only_whitespace() {
        assert_eq!(protect("  "), "[[sdspace]]  [[sdspace]]");
        assert_eq!(protect(" a "), " a ");
        assert_eq!(protect(""), "");
    }

    #[test]
    fn test_strip_round_trip() {
        for s in [" ", "   ", "\t", " \n "] {
            assert_eq!(strip(&protect(s)), s);
        }
        assert!(matches!(strip("plain"), Cow::Borrowed(_)));
    }
}
