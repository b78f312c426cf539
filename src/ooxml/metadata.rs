/// OOXML core properties (`docProps/core.xml`).
///
/// Core properties follow the Dublin Core metadata standard plus OPC
/// extensions. The converter needs `dcterms:created` for document identity;
/// the remaining fields are read for callers that want them.
///
/// Timestamps are kept as the text found in the part. [`parse_datetime`]
/// turns them into `DateTime<Utc>` when needed.
use crate::common::error::{Error, Result};
use crate::common::xml::{Element, XmlNode, matches_local, qualified};
use crate::ooxml::opc::Package;
use crate::ooxml::opc::constants::{content_type, namespace, part_name, relationship_type};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;

/// `xsi:type` written on W3CDTF timestamps.
const W3CDTF: &str = "W3CDTF";

/// Document metadata read from the core properties part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    pub category: Option<String>,
    /// `dcterms:created`, verbatim
    pub created: Option<String>,
    /// `dcterms:modified`, verbatim
    pub modified: Option<String>,
}

impl CoreProperties {
    /// Read the properties from a `cp:coreProperties` root.
    pub fn from_element(root: &Element) -> Self {
        let mut props = Self::default();
        for child in root.elements() {
            let text = child.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let slot = match child.local_name() {
                "title" => &mut props.title,
                "subject" => &mut props.subject,
                "creator" => &mut props.creator,
                "keywords" => &mut props.keywords,
                "description" => &mut props.description,
                "lastModifiedBy" => &mut props.last_modified_by,
                "revision" => &mut props.revision,
                "category" => &mut props.category,
                "created" => &mut props.created,
                "modified" => &mut props.modified,
                _ => continue,
            };
            *slot = Some(text.to_string());
        }
        props
    }

    /// `created` as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(|s| parse_datetime(s).ok())
    }
}

/// Member name of the core properties part.
pub fn part_path(package: &Package) -> String {
    package
        .related_part("", relationship_type::CORE_PROPERTIES)
        .unwrap_or_else(|| part_name::CORE_PROPERTIES.to_string())
}

/// Core properties of `package`, if the part exists and parses.
pub fn read(package: &Package) -> Option<CoreProperties> {
    package
        .xml(&part_path(package))
        .filter(|root| matches_local(&root.name, "coreProperties"))
        .map(CoreProperties::from_element)
}

/// Creation timestamp (`dcterms:created`) text.
pub fn created(package: &Package) -> Option<String> {
    read(package)?.created
}

/// An empty `cp:coreProperties` root with the usual namespace declarations.
pub fn empty_core_properties() -> Element {
    Element::new("cp:coreProperties")
        .with_attr("xmlns:cp", namespace::CORE_PROPERTIES)
        .with_attr("xmlns:dc", namespace::DC)
        .with_attr("xmlns:dcterms", namespace::DCTERMS)
        .with_attr("xmlns:dcmitype", "http://purl.org/dc/dcmitype/")
        .with_attr("xmlns:xsi", namespace::XSI)
}

/// Prefix bound to `uri` on `root`, declaring `fallback` when unbound.
fn bound_prefix(root: &mut Element, uri: &str, fallback: &str) -> String {
    let declared = root
        .attributes
        .iter()
        .find(|(k, v)| v == uri && k.starts_with("xmlns:"))
        .map(|(k, _)| k["xmlns:".len()..].to_string());
    match declared {
        Some(prefix) => prefix,
        None => {
            root.set_attr(format!("xmlns:{}", fallback), uri);
            fallback.to_string()
        },
    }
}

/// Copy of `root` with `dcterms:created` set to `timestamp`.
pub fn with_created(root: &Element, timestamp: &str) -> Element {
    let mut updated = root.clone();
    let dcterms = bound_prefix(&mut updated, namespace::DCTERMS, "dcterms");
    let xsi = bound_prefix(&mut updated, namespace::XSI, "xsi");
    let xsi_type = qualified(Some(&xsi), "type");
    let type_value = qualified(Some(&dcterms), W3CDTF);

    let position = updated
        .children
        .iter()
        .position(|n| n.as_element().is_some_and(|e| e.is("created")));
    match position.and_then(|i| updated.children[i].as_element_mut()) {
        Some(created) => {
            created.set_attr(xsi_type, type_value);
            created.children = vec![XmlNode::text(timestamp)];
        },
        None => updated.push(
            Element::new(qualified(Some(&dcterms), "created"))
                .with_attr(xsi_type, type_value)
                .with_text(timestamp),
        ),
    }
    updated
}

/// Persist the creation timestamp, creating the part (with its package
/// relationship and content-type override) when missing.
pub fn set_created(package: &mut Package, timestamp: &str) {
    let path = part_path(package);
    let created_part = package.xml(&path).is_none();
    let base = match package.xml(&path) {
        Some(root) => root.clone(),
        None => {
            debug!("Creating core properties part '{}'", path);
            empty_core_properties()
        },
    };
    package.insert_xml(path.clone(), with_created(&base, timestamp));
    if created_part {
        package.relate("", relationship_type::CORE_PROPERTIES, &path);
        package.register_content_type(&path, content_type::OPC_CORE_PROPERTIES);
    }
}

/// Parse an ISO 8601 datetime string into a `DateTime<Utc>`.
///
/// Supports formats like:
/// - 2023-10-10T14:30:00Z
/// - 2023-10-10T14:30:00.1234567Z
/// - 2023-10-10T14:30:00
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }
    Err(Error::MalformedStructure(format!("Invalid datetime format: {}", s)))
}
