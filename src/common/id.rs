use rand::RngExt;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Generate a random RFC4122 v4 GUID as raw 16 bytes
pub fn generate_guid_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    let mut rng = rand::rng();
    rng.fill(&mut bytes);
    // RFC4122 v4
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    bytes
}

/// Generate a random GUID in the form XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX
pub fn generate_guid() -> String {
    format_guid(&generate_guid_bytes())
}

/// Format raw GUID bytes as XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX (upper-case)
pub fn format_guid(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(36);
    for (i, b) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push(HEX_UPPER[(b >> 4) as usize] as char);
        out.push(HEX_UPPER[(b & 0x0f) as usize] as char);
    }
    out
}

/// Strip the braces Word puts around GUIDs (`{...}` → `...`).
pub fn strip_guid_braces(guid: &str) -> &str {
    let trimmed = guid.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|g| g.strip_suffix('}'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_guid_format() {
        let s = generate_guid();
        assert_eq!(s.len(), 36);
        for (i, ch) in s.chars().enumerate() {
            if matches!(i, 8 | 13 | 18 | 23) {
                assert_eq!(ch, '-');
                continue;
            }
            assert!(ch.is_ascii_hexdigit());
            if ch.is_ascii_alphabetic() {
                assert!(ch.is_ascii_uppercase());
            }
        }
        // version nibble
        assert_eq!(&s[14..15], "4");
    }

    #[test]
    fn test_format_guid_known_bytes() {
        let bytes = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab,
            0xcd, 0xef,
        ];
        assert_eq!(format_guid(&bytes), "01234567-89AB-CDEF-0123-456789ABCDEF");
    }

    #[test]
    fn test_strip_guid_braces() {
        assert_eq!(strip_guid_braces("{MICROSOFT-GUID-123}"), "MICROSOFT-GUID-123");
        assert_eq!(strip_guid_braces("plain"), "plain");
        assert_eq!(strip_guid_braces("{unbalanced"), "{unbalanced");
    }
}
