/// High-level converter between a WordprocessingML package and a Document Tree.
///
/// A `Converter` owns one package. It reads the main document part into a
/// [`DocNode`] tree, writes an edited tree back, and resolves the
/// document's identity from the settings, custom-property and
/// core-property parts.
///
/// # Examples
///
/// ```rust
/// use quince::{ConvertOptions, Converter};
///
/// let mut converter = Converter::new_document(ConvertOptions::default());
/// let tree = converter.to_document_tree()?;
/// let records = converter.export(&tree)?;
/// assert!(records.iter().any(|r| r.path == "word/document.xml"));
/// # Ok::<(), quince::Error>(())
/// ```
use crate::common::error::Result;
use crate::config::ConvertOptions;
use crate::ooxml::docx::context::EncodeContext;
use crate::ooxml::docx::identity::{DocumentIdentity, Generated, IdentitySource, SystemSource};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::encode_element;
use crate::ooxml::docx::{export, settings, template};
use crate::ooxml::opc::{Package, PartRecord};
use crate::ooxml::{custom_properties, metadata};
use log::{debug, warn};

/// Parallel batch threshold; smaller batches are converted in order.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 2;

/// Converter for one document package.
#[derive(Debug, Clone)]
pub struct Converter {
    package: Package,
    options: ConvertOptions,
    document_part: String,
    source: Option<Vec<u8>>,
    identity: DocumentIdentity,
}

impl Converter {
    /// Converter over an already loaded package.
    pub fn from_package(package: Package, options: ConvertOptions) -> Self {
        let document_part = package.main_document_path();
        let identity = DocumentIdentity::resolve(
            settings::vendor_document_id(&package, &document_part).as_deref(),
            custom_properties::get(&package, &options.guid_property_name).as_deref(),
            metadata::created(&package).as_deref(),
        );
        debug!(
            "Loaded package with main part '{}' (guid: {:?}, created: {:?})",
            document_part, identity.guid, identity.created
        );
        Self {
            package,
            options,
            document_part,
            source: None,
            identity,
        }
    }

    /// Converter over the parts read from an archive.
    pub fn from_records<I>(records: I, options: ConvertOptions) -> Self
    where
        I: IntoIterator<Item = PartRecord>,
    {
        Self::from_package(Package::from_records(records), options)
    }

    /// Attach the raw archive bytes the package was read from. They are
    /// hashed when the document has no stable identity yet.
    pub fn with_source_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.source = Some(bytes.into());
        self
    }

    /// A new blank document, timestamped now.
    pub fn new_document(options: ConvertOptions) -> Self {
        Self::new_document_with(options, &mut SystemSource)
    }

    /// A new blank document, timestamped from `source`.
    pub fn new_document_with(options: ConvertOptions, source: &mut dyn IdentitySource) -> Self {
        let mut package = Package::from_records(template::blank_document());
        let identity = DocumentIdentity::fresh(source);
        if let Some(created) = &identity.created {
            metadata::set_created(&mut package, created);
        }
        let document_part = package.main_document_path();
        Self {
            package,
            options,
            document_part,
            source: None,
            identity,
        }
    }

    #[inline]
    pub fn package(&self) -> &Package {
        &self.package
    }

    #[inline]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Member name of the main document part.
    #[inline]
    pub fn document_part(&self) -> &str {
        &self.document_part
    }

    #[inline]
    pub fn identity(&self) -> &DocumentIdentity {
        &self.identity
    }

    /// Resolved document GUID, if known.
    #[inline]
    pub fn guid(&self) -> Option<&str> {
        self.identity.guid.as_deref()
    }

    /// Creation timestamp, if known.
    #[inline]
    pub fn created(&self) -> Option<&str> {
        self.identity.created.as_deref()
    }

    /// Whether identity values were generated since loading.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.identity.modified
    }

    /// Read the main document part into a Document Tree.
    ///
    /// A document without a body yields an empty `doc` node.
    pub fn to_document_tree(&self) -> Result<DocNode> {
        let root = self.package.require_xml(&self.document_part)?;
        let Some(body) = root.child("body") else {
            return Ok(Node::new(kind::DOC).into());
        };
        let mut ctx = EncodeContext::new(&self.package, &self.document_part, &self.options);
        Ok(encode_element(body, &mut ctx).unwrap_or_else(|| Node::new(kind::DOC).into()))
    }

    /// Write `tree` back into the package and return every part.
    pub fn export(&mut self, tree: &DocNode) -> Result<Vec<PartRecord>> {
        export::apply(&mut self.package, &self.document_part, tree, &self.options)?;
        Ok(self.package.to_records())
    }

    /// Stable identifier of the document.
    ///
    /// Generates and persists a missing GUID or creation timestamp.
    pub fn document_identifier(&mut self) -> String {
        self.document_identifier_with(&mut SystemSource)
    }

    /// [`Converter::document_identifier`] with an explicit identity source.
    pub fn document_identifier_with(&mut self, source: &mut dyn IdentitySource) -> String {
        let (identifier, generated) = self
            .identity
            .document_identifier(self.source.as_deref(), source);
        self.persist(&generated);
        identifier
    }

    /// The document GUID, generating and persisting one if needed.
    pub fn promote_to_guid(&mut self) -> String {
        self.promote_to_guid_with(&mut SystemSource)
    }

    /// [`Converter::promote_to_guid`] with an explicit identity source.
    pub fn promote_to_guid_with(&mut self, source: &mut dyn IdentitySource) -> String {
        let (guid, generated) = self.identity.promote_to_guid(source);
        self.persist(&Generated {
            guid: generated,
            timestamp: None,
        });
        guid
    }

    fn persist(&mut self, generated: &Generated) {
        if let Some(guid) = &generated.guid {
            let name = self.options.guid_property_name.clone();
            if !custom_properties::set(&mut self.package, &name, guid, false) {
                warn!("Could not persist document GUID as custom property '{}'", name);
            }
        }
        if let Some(timestamp) = &generated.timestamp {
            metadata::set_created(&mut self.package, timestamp);
        }
    }
}

/// Convert several independent packages to Document Trees.
///
/// With the `parallel` feature the packages are converted concurrently.
/// Results are returned in input order.
pub fn convert_all(packages: Vec<Vec<PartRecord>>, options: &ConvertOptions) -> Vec<Result<DocNode>> {
    let convert = |records: Vec<PartRecord>| {
        Converter::from_records(records, options.clone()).to_document_tree()
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if packages.len() >= PARALLEL_THRESHOLD {
            return packages.into_par_iter().map(convert).collect();
        }
    }

    packages.into_iter().map(convert).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hash::identity_hash;
    use crate::ooxml::docx::identity::tests::FixedSource;
    use crate::ooxml::opc::constants::part_name;

    const DOC: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#;

    const SETTINGS_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/></Relationships>"#;

    const CUSTOM: &str = r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="DocumentGuid"><vt:lpwstr>CUSTOM-GUID</vt:lpwstr></property></Properties>"#;

    fn records() -> Vec<PartRecord> {
        vec![PartRecord::new(part_name::DOCUMENT, DOC)]
    }

    #[test]
    fn test_vendor_id_wins_over_custom_property() {
        let mut records = records();
        records.push(PartRecord::new("word/_rels/document.xml.rels", SETTINGS_RELS));
        records.push(PartRecord::new(
            part_name::SETTINGS,
            r#"<w:settings><w15:docId w15:val="{MICROSOFT-GUID-123}"/></w:settings>"#,
        ));
        records.push(PartRecord::new(part_name::CUSTOM_PROPERTIES, CUSTOM));
        let converter = Converter::from_records(records, ConvertOptions::default());
        assert_eq!(converter.guid(), Some("MICROSOFT-GUID-123"));
    }

    #[test]
    fn test_custom_property_guid_used() {
        let mut records = records();
        records.push(PartRecord::new(part_name::CUSTOM_PROPERTIES, CUSTOM));
        let converter = Converter::from_records(records, ConvertOptions::default());
        assert_eq!(converter.guid(), Some("CUSTOM-GUID"));
        assert!(!converter.is_modified());
    }

    #[test]
    fn test_identifier_persists_generated_values() {
        let mut converter = Converter::from_records(records(), ConvertOptions::default())
            .with_source_bytes(b"test file content".to_vec());
        let mut source = FixedSource { guids: 0 };
        assert_eq!(converter.document_identifier_with(&mut source), "HASH-61D1432F");

        let guid = converter.guid().unwrap().to_string();
        assert_eq!(
            custom_properties::get(converter.package(), "DocumentGuid").as_deref(),
            Some(guid.as_str())
        );
        assert_eq!(
            metadata::created(converter.package()).as_deref(),
            Some("2024-03-05T09:41:00Z")
        );
        assert_eq!(
            converter.document_identifier_with(&mut source),
            identity_hash(&guid, "2024-03-05T09:41:00Z")
        );
    }

    #[test]
    fn test_same_bytes_same_identifier() {
        let mut a = Converter::from_records(records(), ConvertOptions::default())
            .with_source_bytes(b"abc".to_vec());
        let mut b = Converter::from_records(records(), ConvertOptions::default())
            .with_source_bytes(b"abc".to_vec());
        assert_eq!(a.document_identifier(), b.document_identifier());
    }

    #[test]
    fn test_promote_to_guid_persists_under_configured_name() {
        let options = ConvertOptions::default().with_guid_property_name("Ident");
        let mut converter = Converter::from_records(records(), options);
        let mut source = FixedSource { guids: 0 };
        let guid = converter.promote_to_guid_with(&mut source);
        assert_eq!(custom_properties::get(converter.package(), "Ident"), Some(guid.clone()));
        assert_eq!(converter.promote_to_guid_with(&mut source), guid);
        assert_eq!(source.guids, 1);
    }

    #[test]
    fn test_new_document_is_timestamped() {
        let mut source = FixedSource { guids: 0 };
        let converter = Converter::new_document_with(ConvertOptions::default(), &mut source);
        assert_eq!(converter.created(), Some("2024-03-05T09:41:00Z"));
        assert_eq!(
            metadata::created(converter.package()).as_deref(),
            Some("2024-03-05T09:41:00Z")
        );
        assert_eq!(converter.document_part(), part_name::DOCUMENT);
        let tree = converter.to_document_tree().unwrap();
        assert_eq!(tree.kind(), Some(kind::DOC));
    }

    #[test]
    fn test_tree_round_trip_preserves_document() {
        let mut converter = Converter::from_records(records(), ConvertOptions::default());
        let tree = converter.to_document_tree().unwrap();
        assert_eq!(tree.plain_text(), "Hello");
        let records = converter.export(&tree).unwrap();
        let again = Converter::from_records(records, ConvertOptions::default());
        assert_eq!(again.to_document_tree().unwrap(), tree);
    }

    #[test]
    fn test_convert_all_keeps_order() {
        let other = DOC.replace("Hello", "World");
        let batches = vec![
            records(),
            vec![PartRecord::new(part_name::DOCUMENT, other)],
            Vec::new(),
        ];
        let results = convert_all(batches, &ConvertOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().plain_text(), "Hello");
        assert_eq!(results[1].as_ref().unwrap().plain_text(), "World");
        assert!(results[2].is_err());
    }
}
