/// Document settings (`word/settings.xml`).
///
/// Only what the converter needs is read: the vendor-assigned document id
/// (`w15:docId`) used for document identity, and whether revisions are
/// being tracked.
use crate::common::id::strip_guid_braces;
use crate::common::xml::Element;
use crate::ooxml::docx::format::is_on;
use crate::ooxml::opc::Package;
use crate::ooxml::opc::constants::{part_name, relationship_type};

/// Settings relevant to conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSettings {
    /// `w15:docId` without its braces
    pub doc_id: Option<String>,
    /// `w:trackRevisions`
    pub track_revisions: bool,
}

impl DocumentSettings {
    /// Read settings from a `w:settings` root.
    ///
    /// Several `docId` elements may be present (`w14:docId`, `w15:docId`);
    /// the `w15` one is preferred, then the last one seen.
    pub fn from_element(root: &Element) -> Self {
        let mut doc_id: Option<(bool, String)> = None;
        let mut track_revisions = false;
        for child in root.elements() {
            match child.local_name() {
                "docId" => {
                    let Some(val) = child.attr_local("val") else {
                        continue;
                    };
                    let val = strip_guid_braces(val);
                    if val.is_empty() {
                        continue;
                    }
                    let preferred = child.prefix() == Some("w15");
                    if preferred || doc_id.as_ref().is_none_or(|(w15, _)| !*w15) {
                        doc_id = Some((preferred, val.to_string()));
                    }
                },
                "trackRevisions" => {
                    track_revisions = child.attr_local("val").is_none_or(is_on);
                },
                _ => {},
            }
        }
        Self {
            doc_id: doc_id.map(|(_, id)| id),
            track_revisions,
        }
    }
}

/// Member name of the settings part used by `document_part`.
pub fn settings_part(package: &Package, document_part: &str) -> String {
    package
        .related_part(document_part, relationship_type::SETTINGS)
        .unwrap_or_else(|| part_name::SETTINGS.to_string())
}

/// Settings of the document at `document_part`, if the part exists.
pub fn read(package: &Package, document_part: &str) -> Option<DocumentSettings> {
    package
        .xml(&settings_part(package, document_part))
        .map(DocumentSettings::from_element)
}

/// Vendor document id of the document at `document_part`.
pub fn vendor_document_id(package: &Package, document_part: &str) -> Option<String> {
    read(package, document_part)?.doc_id
}
