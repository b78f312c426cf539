use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use std::borrow::Cow;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// LeftmostLongest so "&amp;lt;" decodes to "&lt;" rather than "<"
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape the five reserved XML characters.
///
/// # Examples
///
/// ```
/// use quince::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape the five predefined XML entities.
///
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use quince::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;");
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Resolve the body of an entity reference (the part between `&` and `;`).
///
/// Handles the predefined entities and decimal/hex character references.
/// Anything else is returned re-wrapped so it survives a round trip.
pub(crate) fn resolve_entity(name: &str) -> Cow<'static, str> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => atoi_simd::parse::<u32, false, false>(num.as_bytes()).ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    match resolved {
        Some(c) => Cow::Owned(c.to_string()),
        None => Cow::Owned(format!("&{};", name)),
    }
}

/// Decode every entity and character reference in raw XML text.
///
/// Unlike [`unescape_xml`], numeric references such as `&#10;` are resolved
/// too; unknown named entities are kept verbatim.
pub(crate) fn decode_entities(raw: &str) -> Cow<'_, str> {
    let bytes = raw.as_bytes();
    let Some(first) = memchr::memchr(b'&', bytes) else {
        return Cow::Borrowed(raw);
    };
    let mut out = String::with_capacity(raw.len());
    out.push_str(&raw[..first]);
    let mut pos = first;
    while pos < bytes.len() {
        match memchr::memchr(b';', &bytes[pos..]) {
            Some(len) if len > 1 => {
                out.push_str(&resolve_entity(&raw[pos + 1..pos + len]));
                pos += len + 1;
            },
            _ => {
                out.push('&');
                pos += 1;
            },
        }
        let next = memchr::memchr(b'&', &bytes[pos..]).map_or(bytes.len(), |n| pos + n);
        out.push_str(&raw[pos..next]);
        pos = next;
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), "&");
        assert_eq!(resolve_entity("#65"), "A");
        assert_eq!(resolve_entity("#x20AC"), "€");
        assert_eq!(resolve_entity("nbsp"), "&nbsp;");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("a &amp; b&#10;c"), "a & b\nc");
        assert_eq!(decode_entities("R&D"), "R&D");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    proptest! {
        #[test]
        fn prop_decode_matches_unescape(s in ".*") {
            prop_assert_eq!(decode_entities(&escape_xml(&s)).into_owned(), s);
        }

        #[test]
        fn prop_escape_unescape_inverse(s in ".*") {
            prop_assert_eq!(unescape_xml(&escape_xml(&s)), s);
        }

        #[test]
        fn prop_escaped_has_no_reserved(s in ".*") {
            let escaped = escape_xml(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }
    }
}
