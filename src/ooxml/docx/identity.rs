//! Document identity.
//!
//! A document is identified by a GUID and its creation timestamp. The GUID
//! comes from the vendor-assigned `w15:docId` when there is one, else from
//! the GUID custom property. Missing values are generated lazily, the first
//! time an identifier is requested, and reported back so the caller can
//! persist them.
//!
//! The resolver itself never touches a package and draws randomness and
//! time from an [`IdentitySource`], so it can be driven deterministically.
use crate::common::hash::{content_hash, identity_hash};
use crate::common::id::generate_guid;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Timestamp layout: UTC, truncated to the minute.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:00Z";

/// Randomness and clock used to fill in missing identity values.
pub trait IdentitySource {
    fn new_guid(&mut self) -> String;
    fn now(&mut self) -> DateTime<Utc>;
}

/// [`IdentitySource`] backed by the thread RNG and the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl IdentitySource for SystemSource {
    fn new_guid(&mut self) -> String {
        generate_guid()
    }

    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Format a creation timestamp.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Values generated by the last identity request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub guid: Option<String>,
    pub timestamp: Option<String>,
}

impl Generated {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.guid.is_none() && self.timestamp.is_none()
    }
}

/// Identity state of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub guid: Option<String>,
    /// Creation timestamp, as found in the package or as generated
    pub created: Option<String>,
    /// Whether a value was generated and still needs to be written back
    pub modified: bool,
}

impl DocumentIdentity {
    /// Resolve identity from what a package carries.
    ///
    /// The vendor id wins over the custom-property GUID.
    pub fn resolve(vendor_id: Option<&str>, custom_guid: Option<&str>, created: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            guid: non_empty(vendor_id).or_else(|| non_empty(custom_guid)),
            created: non_empty(created),
            modified: false,
        }
    }

    /// Identity of a newly created document: timestamped immediately, no
    /// GUID until one is requested.
    pub fn fresh(source: &mut dyn IdentitySource) -> Self {
        Self {
            guid: None,
            created: Some(format_timestamp(source.now())),
            modified: true,
        }
    }

    /// Stable identifier for the document.
    ///
    /// With both a GUID and a timestamp this is the hash of the pair.
    /// Otherwise it is the hash of `content` (the raw package bytes), and
    /// the missing values are generated. Without `content` the identifier
    /// is taken from the completed pair instead.
    pub fn document_identifier(
        &mut self,
        content: Option<&[u8]>,
        source: &mut dyn IdentitySource,
    ) -> (String, Generated) {
        if let (Some(guid), Some(created)) = (&self.guid, &self.created) {
            return (identity_hash(guid, created), Generated::default());
        }

        let mut generated = Generated::default();
        if self.guid.is_none() {
            let guid = source.new_guid();
            debug!("Generated document GUID {}", guid);
            self.guid = Some(guid.clone());
            generated.guid = Some(guid);
        }
        if self.created.is_none() {
            let created = format_timestamp(source.now());
            debug!("Generated creation timestamp {}", created);
            self.created = Some(created.clone());
            generated.timestamp = Some(created);
        }
        self.modified = true;

        let identifier = match content {
            Some(bytes) => content_hash(bytes),
            None => identity_hash(
                self.guid.as_deref().unwrap_or_default(),
                self.created.as_deref().unwrap_or_default(),
            ),
        };
        (identifier, generated)
    }

    /// The GUID, generating one if needed. The second value is the GUID
    /// when it was just generated.
    pub fn promote_to_guid(&mut self, source: &mut dyn IdentitySource) -> (String, Option<String>) {
        if let Some(guid) = &self.guid {
            return (guid.clone(), None);
        }
        let guid = source.new_guid();
        debug!("Promoted document to GUID {}", guid);
        self.guid = Some(guid.clone());
        self.modified = true;
        (guid.clone(), Some(guid))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Deterministic source for tests.
    pub(crate) struct FixedSource {
        pub guids: u32,
    }

    impl IdentitySource for FixedSource {
        fn new_guid(&mut self) -> String {
            self.guids += 1;
            format!("00000000-0000-4000-8000-{:012}", self.guids)
        }

        fn now(&mut self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 41, 27).unwrap()
        }
    }

    #[test]
    fn test_vendor_id_wins() {
        let identity = DocumentIdentity::resolve(Some("MICROSOFT-GUID-123"), Some("CUSTOM"), None);
        assert_eq!(identity.guid.as_deref(), Some("MICROSOFT-GUID-123"));
        let identity = DocumentIdentity::resolve(None, Some("CUSTOM"), None);
        assert_eq!(identity.guid.as_deref(), Some("CUSTOM"));
        assert_eq!(DocumentIdentity::resolve(Some(" "), None, None).guid, None);
    }

    #[test]
    fn test_content_hash_then_generation() {
        let mut source = FixedSource { guids: 0 };
        let mut identity = DocumentIdentity::resolve(None, None, None);
        let (id, generated) = identity.document_identifier(Some(b"test file content"), &mut source);
        assert_eq!(id, "HASH-61D1432F");
        assert!(identity.modified);
        assert!(identity.guid.is_some());
        assert_eq!(identity.created.as_deref(), Some("2024-03-05T09:41:00Z"));
        assert_eq!(generated.guid, identity.guid);

        // Now both are known: the pair hash, and nothing new generated.
        let (again, generated) = identity.document_identifier(Some(b"test file content"), &mut source);
        let guid = identity.guid.as_deref().unwrap();
        assert_eq!(again, identity_hash(guid, "2024-03-05T09:41:00Z"));
        assert!(generated.is_empty());
    }

    #[test]
    fn test_pair_hash_is_stable() {
        let mut source = FixedSource { guids: 0 };
        let mut a = DocumentIdentity::resolve(Some("G"), None, Some("2024-01-01T00:00:00Z"));
        let mut b = a.clone();
        let (ida, _) = a.document_identifier(Some(b"one"), &mut source);
        let (idb, _) = b.document_identifier(Some(b"two"), &mut source);
        assert_eq!(ida, idb);
        assert!(!a.modified);
        assert_eq!(source.guids, 0);
    }

    #[test]
    fn test_only_missing_timestamp_generated() {
        let mut source = FixedSource { guids: 0 };
        let mut identity = DocumentIdentity::resolve(Some("G"), None, None);
        let (_, generated) = identity.document_identifier(None, &mut source);
        assert_eq!(generated.guid, None);
        assert!(generated.timestamp.is_some());
        assert_eq!(identity.guid.as_deref(), Some("G"));
    }

    #[test]
    fn test_promote_to_guid() {
        let mut source = FixedSource { guids: 0 };
        let mut identity = DocumentIdentity::resolve(None, None, Some("2024-01-01T00:00:00Z"));
        let (guid, generated) = identity.promote_to_guid(&mut source);
        assert_eq!(generated.as_deref(), Some(guid.as_str()));
        let (same, generated) = identity.promote_to_guid(&mut source);
        assert_eq!(same, guid);
        assert_eq!(generated, None);
        assert_eq!(source.guids, 1);
    }

    #[test]
    fn test_fresh_document_is_timestamped() {
        let mut source = FixedSource { guids: 0 };
        let identity = DocumentIdentity::fresh(&mut source);
        assert_eq!(identity.created.as_deref(), Some("2024-03-05T09:41:00Z"));
        assert_eq!(identity.guid, None);
    }
}
