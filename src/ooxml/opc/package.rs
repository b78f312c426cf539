/// In-memory package: the ordered set of parts handed over by the archive
/// layer, with XML parts parsed into element trees.
///
/// Parts keep their original text. Only parts that were modified through
/// [`Package::xml_mut`] or inserted are re-serialized on export; everything
/// else is written back byte-for-byte.
use crate::common::error::{Error, Result};
use crate::common::xml::{Element, parse, serialize_document};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types;
use crate::ooxml::opc::packuri::{
    CONTENT_TYPES_PART, PACKAGE_RELS_PART, ext, rels_part_for, relative_ref, resolve_target,
};
use crate::ooxml::opc::rel::{self, Relationship};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One part as exchanged with the archive reader/writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Member name inside the archive (`word/document.xml`)
    pub path: String,
    /// Part content
    pub content: String,
}

impl PartRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum PartState {
    /// Parsed successfully
    Xml(Element),
    /// XML part whose text is not well-formed; carried through verbatim
    Malformed(String),
    /// Not an XML part
    Opaque,
}

/// A single part of a [`Package`].
#[derive(Debug, Clone)]
pub struct Part {
    path: String,
    raw: String,
    state: PartState,
    dirty: bool,
}

impl Part {
    /// Member name of this part.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parsed root element, if this is a well-formed XML part.
    pub fn xml(&self) -> Option<&Element> {
        match &self.state {
            PartState::Xml(root) => Some(root),
            _ => None,
        }
    }

    /// Parse failure message for malformed XML parts.
    pub fn parse_error(&self) -> Option<&str> {
        match &self.state {
            PartState::Malformed(message) => Some(message),
            _ => None,
        }
    }

    /// Original text of the part.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn record(&self) -> PartRecord {
        let content = match &self.state {
            PartState::Xml(root) if self.dirty => serialize_document(root),
            _ => self.raw.clone(),
        };
        PartRecord {
            path: self.path.clone(),
            content,
        }
    }
}

/// Whether a member name denotes an XML part.
pub fn is_xml_member(path: &str) -> bool {
    matches!(
        ext(path).to_ascii_lowercase().as_str(),
        "xml" | "rels" | "vml"
    )
}

/// The full set of parts making up one document.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a package from archive records, parsing every XML part.
    ///
    /// A part that is not well-formed is kept as raw text and logged; it
    /// does not abort loading the other parts.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PartRecord>,
    {
        let mut package = Self::new();
        for record in records {
            let state = if is_xml_member(&record.path) {
                match parse(&record.content) {
                    Ok(root) => PartState::Xml(root),
                    Err(e) => {
                        let e = e.in_part(&record.path);
                        warn!("Keeping malformed part verbatim: {}", e);
                        PartState::Malformed(e.to_string())
                    },
                }
            } else {
                PartState::Opaque
            };
            package.upsert(Part {
                path: record.path,
                raw: record.content,
                state,
                dirty: false,
            });
        }
        package
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.path == path)
    }

    fn upsert(&mut self, part: Part) {
        match self.position(&part.path) {
            Some(i) => self.parts[i] = part,
            None => self.parts.push(part),
        }
    }

    /// Check whether a part exists.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    /// Member names in package order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.path.as_str())
    }

    /// Get a part by member name.
    pub fn part(&self, path: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.path == path)
    }

    /// Parsed root of an XML part.
    pub fn xml(&self, path: &str) -> Option<&Element> {
        self.part(path).and_then(Part::xml)
    }

    /// Mutable root of an XML part. Marks the part for re-serialization.
    pub fn xml_mut(&mut self, path: &str) -> Option<&mut Element> {
        let part = self.parts.iter_mut().find(|p| p.path == path)?;
        match &mut part.state {
            PartState::Xml(root) => {
                part.dirty = true;
                Some(root)
            },
            _ => None,
        }
    }

    /// Parsed root of an XML part, or the reason it is unavailable.
    pub fn require_xml(&self, path: &str) -> Result<&Element> {
        let part = self
            .part(path)
            .ok_or_else(|| Error::PartNotFound(path.to_string()))?;
        match &part.state {
            PartState::Xml(root) => Ok(root),
            PartState::Malformed(message) => Err(Error::MalformedXml {
                part: path.to_string(),
                message: message.clone(),
            }),
            PartState::Opaque => Err(Error::Other(format!("Part '{}' is not XML", path))),
        }
    }

    /// Insert or replace an XML part.
    pub fn insert_xml(&mut self, path: impl Into<String>, root: Element) {
        self.upsert(Part {
            path: path.into(),
            raw: String::new(),
            state: PartState::Xml(root),
            dirty: true,
        });
    }

    /// Insert or replace a part from text, parsing it when it is XML.
    pub fn insert_record(&mut self, record: PartRecord) {
        let mut single = Self::from_records([record]);
        if let Some(mut part) = single.parts.pop() {
            part.dirty = false;
            self.upsert(part);
        }
    }

    /// Remove a part. Returns whether it existed.
    pub fn remove(&mut self, path: &str) -> bool {
        match self.position(path) {
            Some(i) => {
                self.parts.remove(i);
                true
            },
            None => false,
        }
    }

    /// Relationships whose source is `source` (empty string for the package).
    pub fn relationships(&self, source: &str) -> Vec<Relationship> {
        self.xml(&rels_part_for(source))
            .map(rel::relationships_from_element)
            .unwrap_or_default()
    }

    /// Replace the relationships of `source`, keeping the existing part's
    /// root name and namespace declarations. Creates the part if missing.
    pub fn set_relationships(&mut self, source: &str, rels: &[Relationship]) {
        let path = rels_part_for(source);
        let root = rel::relationships_to_element(rels, self.xml(&path));
        self.insert_xml(path, root);
    }

    /// Register a relationship from `source` to `target_member` of
    /// `rel_type` through the merge algorithm and return its id.
    pub fn relate(&mut self, source: &str, rel_type: &str, target_member: &str) -> Option<String> {
        let target = relative_ref(source, target_member);
        let existing = self.relationships(source);
        if let Some(found) = existing
            .iter()
            .find(|r| r.rel_type == rel_type && r.target == target)
        {
            return Some(found.id.clone());
        }
        let incoming = [Relationship::new("", rel_type, target)];
        let outcome = rel::merge(&existing, &incoming);
        let changed = outcome.changed();
        let id = outcome.assigned.into_iter().next().flatten();
        if changed {
            let merged = outcome.relationships.into_owned();
            self.set_relationships(source, &merged);
        }
        id
    }

    /// Resolved member name of the first relationship of `rel_type` from
    /// `source`.
    pub fn related_part(&self, source: &str, rel_type: &str) -> Option<String> {
        self.relationships(source)
            .iter()
            .find(|r| r.rel_type == rel_type && !r.is_external())
            .map(|r| resolve_target(source, &r.target))
    }

    /// Member name of the main document part.
    ///
    /// Follows the package-level officeDocument relationship, falling back
    /// to `word/document.xml`.
    pub fn main_document_path(&self) -> String {
        self.related_part("", relationship_type::OFFICE_DOCUMENT)
            .unwrap_or_else(|| crate::ooxml::opc::constants::part_name::DOCUMENT.to_string())
    }

    /// Add (or update) the content-type override for `member`, creating
    /// `[Content_Types].xml` if needed.
    pub fn register_content_type(&mut self, member: &str, content_type: &str) {
        if self.xml(CONTENT_TYPES_PART).is_none() && !self.contains(CONTENT_TYPES_PART) {
            self.insert_xml(CONTENT_TYPES_PART, content_types::empty_types());
        }
        if let Some(types) = self.xml_mut(CONTENT_TYPES_PART) {
            content_types::set_override(types, member, content_type);
        }
    }

    /// Drop the content-type override for `member`, if any.
    pub fn unregister_content_type(&mut self, member: &str) {
        let has_override = self
            .xml(CONTENT_TYPES_PART)
            .is_some_and(|t| content_types::override_for(t, member).is_some());
        if has_override && let Some(types) = self.xml_mut(CONTENT_TYPES_PART) {
            content_types::remove_override(types, member);
            debug!("Removed content type override for '{}'", member);
        }
    }

    /// Ensure the package relationships part exists.
    pub fn ensure_package_rels(&mut self) {
        if !self.contains(PACKAGE_RELS_PART) {
            self.set_relationships("", &[]);
        }
    }

    /// Write every part back out, in package order.
    pub fn to_records(&self) -> Vec<PartRecord> {
        self.parts.iter().map(Part::record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};

    const PKG_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/main.xml"/></Relationships>"#;

    fn sample() -> Package {
        Package::from_records([
            PartRecord::new("_rels/.rels", PKG_RELS),
            PartRecord::new("word/main.xml", "<w:document><w:body/></w:document>"),
            PartRecord::new("word/broken.xml", "<w:hdr><w:p></w:hdr>"),
            PartRecord::new("word/media/image1.png", "\u{89}PNG"),
        ])
    }

    #[test]
    fn test_malformed_part_does_not_abort_load() {
        let pkg = sample();
        assert!(pkg.xml("word/main.xml").is_some());
        assert!(pkg.part("word/broken.xml").unwrap().parse_error().is_some());
        assert!(matches!(
            pkg.require_xml("word/broken.xml"),
            Err(Error::MalformedXml { ref part, .. }) if part == "word/broken.xml"
        ));
        assert!(matches!(
            pkg.require_xml("word/missing.xml"),
            Err(Error::PartNotFound(_))
        ));
    }

    #[test]
    fn test_main_document_path_follows_relationship() {
        assert_eq!(sample().main_document_path(), "word/main.xml");
        assert_eq!(Package::new().main_document_path(), "word/document.xml");
    }

    #[test]
    fn test_untouched_parts_written_verbatim() {
        let mut pkg = sample();
        let records = pkg.to_records();
        assert_eq!(records[0].content, PKG_RELS);
        assert_eq!(records[2].content, "<w:hdr><w:p></w:hdr>");
        assert_eq!(records[3].content, "\u{89}PNG");

        pkg.xml_mut("word/main.xml").unwrap().set_attr("x", "1");
        let records = pkg.to_records();
        assert!(records[1].content.starts_with("<?xml"));
        assert!(records[1].content.contains(r#"<w:document x="1">"#));
    }

    #[test]
    fn test_relate_allocates_and_reuses() {
        let mut pkg = sample();
        let id = pkg.relate("", rt::CUSTOM_PROPERTIES, "docProps/custom.xml");
        assert_eq!(id.as_deref(), Some("rId2"));
        let again = pkg.relate("", rt::CUSTOM_PROPERTIES, "docProps/custom.xml");
        assert_eq!(again, id);
        assert_eq!(pkg.relationships("").len(), 2);
    }

    #[test]
    fn test_content_type_registration() {
        let mut pkg = Package::new();
        pkg.register_content_type("docProps/custom.xml", ct::OFC_CUSTOM_PROPERTIES);
        let types = pkg.xml(CONTENT_TYPES_PART).unwrap();
        assert_eq!(
            content_types::override_for(types, "docProps/custom.xml"),
            Some(ct::OFC_CUSTOM_PROPERTIES)
        );
        pkg.unregister_content_type("docProps/custom.xml");
        assert!(pkg.xml(CONTENT_TYPES_PART).unwrap().children.is_empty());
    }

    #[test]
    fn test_remove_part() {
        let mut pkg = sample();
        assert!(pkg.remove("word/broken.xml"));
        assert!(!pkg.remove("word/broken.xml"));
        assert_eq!(pkg.paths().count(), 3);
    }
}
