//! Qualified-name helpers.
//!
//! Observed element names look like `local` or `prefix:local`. The prefix is
//! never resolved against its namespace URI here; callers that must accept
//! any prefix go through [`matches_local`].

/// Check whether an observed name refers to the expected local name.
///
/// Matches when `observed` equals `expected` exactly, or when it is
/// `"<prefix>:<expected>"` with a non-empty prefix. An empty prefix
/// (`":Properties"`) never matches.
///
/// # Examples
///
/// ```
/// use quince::common::xml::matches_local;
/// assert!(matches_local("op:Properties", "Properties"));
/// assert!(matches_local("Properties", "Properties"));
/// assert!(!matches_local(":Properties", "Properties"));
/// assert!(!matches_local("op:properties", "Properties"));
/// ```
pub fn matches_local(observed: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    if observed == expected {
        return true;
    }
    match observed.strip_suffix(expected).and_then(|p| p.strip_suffix(':')) {
        Some(prefix) => !prefix.is_empty() && !prefix.contains(':'),
        None => false,
    }
}

/// Local part of a qualified name (`"w:p"` → `"p"`).
#[inline]
pub fn local_name(name: &str) -> &str {
    match memchr::memrchr(b':', name.as_bytes()) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Prefix of a qualified name, if any (`"w:p"` → `Some("w")`).
///
/// An empty prefix (`":p"`) is reported as `None`.
#[inline]
pub fn prefix(name: &str) -> Option<&str> {
    match memchr::memrchr(b':', name.as_bytes()) {
        Some(pos) if pos > 0 => Some(&name[..pos]),
        _ => None,
    }
}

/// Build a qualified name from an optional prefix and a local name.
pub fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => {
            let mut out = String::with_capacity(p.len() + 1 + local.len());
            out.push_str(p);
            out.push(':');
            out.push_str(local);
            out
        },
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matches_local() {
        assert!(matches_local("op:Properties", "Properties"));
        assert!(!matches_local(":Properties", "Properties"));
        assert!(matches_local("Properties", "Properties"));
        assert!(!matches_local("Properties", "properties"));
        assert!(!matches_local("xProperties", "Properties"));
        assert!(!matches_local("a:b:Properties", "Properties"));
        assert!(!matches_local("", ""));
    }

    #[test]
    fn test_local_name_and_prefix() {
        assert_eq!(local_name("w:tbl"), "tbl");
        assert_eq!(local_name("tbl"), "tbl");
        assert_eq!(prefix("w14:paraId"), Some("w14"));
        assert_eq!(prefix("Id"), None);
        assert_eq!(prefix(":Id"), None);
    }

    #[test]
    fn test_qualified() {
        assert_eq!(qualified(Some("vt"), "lpwstr"), "vt:lpwstr");
        assert_eq!(qualified(None, "property"), "property");
        assert_eq!(qualified(Some(""), "property"), "property");
    }

    proptest! {
        #[test]
        fn prop_any_nonempty_prefix_matches(p in "[a-z][a-z0-9]{0,6}", l in "[A-Za-z][A-Za-z0-9]{0,10}") {
            let observed = format!("{}:{}", p, l);
            prop_assert!(matches_local(&observed, &l));
            prop_assert_eq!(local_name(&observed), l.as_str());
            prop_assert_eq!(qualified(prefix(&observed), local_name(&observed)), observed.clone());
        }
    }
}
