//! OOXML custom document properties.
//!
//! Custom properties are stored in the `docProps/custom.xml` part and attach
//! named, typed values to a document:
//!
//! ```xml
//! <Properties xmlns="...custom-properties" xmlns:vt="...docPropsVTypes">
//!   <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="DocumentGuid">
//!     <vt:lpwstr>6F1C...</vt:lpwstr>
//!   </property>
//! </Properties>
//! ```
//!
//! Producers disagree on prefixes (`op:Properties`, `op:property`, no prefix
//! at all), so every lookup goes through [`matches_local`]. A property whose
//! value wrapper is missing or empty is treated as absent and logged, never
//! raised.
//!
//! Updates are clone-then-mutate: [`with_property`] returns a new tree and
//! leaves its input untouched, and [`set`] only writes the result back into
//! the package once it is complete.
//!
//! # Example
//!
//! ```rust
//! use quince::ooxml::custom_properties;
//! use quince::ooxml::opc::Package;
//!
//! let mut package = Package::new();
//! assert!(custom_properties::set(&mut package, "Reviewer", "Ada", false));
//! assert_eq!(custom_properties::get(&package, "Reviewer").as_deref(), Some("Ada"));
//! ```
use crate::common::error::{Error, Result};
use crate::common::xml::{Element, XmlNode, matches_local, qualified};
use crate::ooxml::docx::format::{format_int, parse_int};
use crate::ooxml::opc::Package;
use crate::ooxml::opc::constants::{content_type, namespace, part_name, relationship_type};
use chrono::{DateTime, Utc};
use log::{debug, warn};

/// Fixed GUID format ID for custom properties as per OOXML specification.
///
/// All custom properties must use this format ID.
pub const FORMAT_ID: &str = "{D5CDD505-2E9C-101B-9397-08002B2CF9AE}";

/// First property id available to user properties; 0 and 1 are reserved.
const FIRST_PID: i64 = 2;

/// FILETIME epoch offset: 100ns intervals between 1601-01-01 and 1970-01-01.
const WINDOWS_EPOCH_OFFSET: i64 = 116_444_736_000_000_000;

/// A custom document property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String value (lpwstr in OOXML)
    String(String),
    /// 32-bit signed integer (i4 in OOXML)
    Integer(i32),
    /// 64-bit signed integer (i8 in OOXML)
    Long(i64),
    /// 64-bit floating point (r8 in OOXML)
    Double(f64),
    /// Boolean value (bool in OOXML)
    Boolean(bool),
    /// DateTime value (filetime in OOXML)
    DateTime(DateTime<Utc>),
}

impl PropertyValue {
    /// Local name of the `vt:*` wrapper for this value.
    pub fn element_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "lpwstr",
            PropertyValue::Integer(_) => "i4",
            PropertyValue::Long(_) => "i8",
            PropertyValue::Double(_) => "r8",
            PropertyValue::Boolean(_) => "bool",
            PropertyValue::DateTime(_) => "filetime",
        }
    }

    /// Text content of the wrapper.
    pub fn to_xml_string(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(i) => format_int(i64::from(*i)),
            PropertyValue::Long(l) => format_int(*l),
            PropertyValue::Double(d) => d.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::DateTime(dt) => {
                let unix_nanos = dt.timestamp_nanos_opt().unwrap_or(0);
                format_int(unix_nanos / 100 + WINDOWS_EPOCH_OFFSET)
            },
        }
    }

    /// Parse wrapper text given the wrapper's local name.
    ///
    /// Unknown wrapper types read as strings.
    pub fn from_xml_string(element: &str, text: &str) -> Result<Self> {
        let invalid = |kind: &str| Error::MalformedStructure(format!("Invalid {} value: {}", kind, text));
        match element {
            "i1" | "i2" | "i4" | "int" | "ui1" | "ui2" => text
                .trim()
                .parse::<i32>()
                .map(PropertyValue::Integer)
                .map_err(|_| invalid(element)),
            "i8" | "ui4" | "ui8" | "uint" => parse_int(text)
                .map(PropertyValue::Long)
                .ok_or_else(|| invalid(element)),
            "r4" | "r8" | "decimal" => text
                .trim()
                .parse::<f64>()
                .map(PropertyValue::Double)
                .map_err(|_| invalid(element)),
            "bool" => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(PropertyValue::Boolean(true)),
                "false" | "0" => Ok(PropertyValue::Boolean(false)),
                _ => Err(invalid(element)),
            },
            "filetime" => {
                let filetime = parse_int(text).ok_or_else(|| invalid(element))?;
                let unix_nanos = filetime
                    .checked_sub(WINDOWS_EPOCH_OFFSET)
                    .ok_or_else(|| invalid(element))?
                    .saturating_mul(100);
                DateTime::from_timestamp(
                    unix_nanos.div_euclid(1_000_000_000),
                    unix_nanos.rem_euclid(1_000_000_000) as u32,
                )
                .map(PropertyValue::DateTime)
                .ok_or_else(|| invalid(element))
            },
            _ => Ok(PropertyValue::String(text.to_string())),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

/// Member name of the custom properties part.
pub fn part_path(package: &Package) -> String {
    package
        .related_part("", relationship_type::CUSTOM_PROPERTIES)
        .unwrap_or_else(|| part_name::CUSTOM_PROPERTIES.to_string())
}

/// Child property element with `name`, matched on any prefix.
fn find_property<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    root.elements()
        .find(|p| matches_local(&p.name, "property") && p.attr("name") == Some(name))
}

/// The single value wrapper of a property and its text, when well formed.
fn wrapper(property: &Element) -> Option<(&Element, String)> {
    let wrapper = property.elements().next()?;
    let text = wrapper.text();
    if text.is_empty() {
        return None;
    }
    Some((wrapper, text))
}

/// Raw wrapper (local name, text) of property `name` in a properties tree.
fn read_raw(root: &Element, name: &str) -> Option<(String, String)> {
    if !matches_local(&root.name, "Properties") {
        warn!("Custom properties root is <{}>, not Properties", root.name);
        return None;
    }
    let property = find_property(root, name)?;
    match wrapper(property) {
        Some((w, text)) => Some((w.local_name().to_string(), text)),
        None => {
            warn!("Custom property '{}' has no value", name);
            None
        },
    }
}

/// Text value of property `name` in a properties tree.
pub fn read(root: &Element, name: &str) -> Option<String> {
    read_raw(root, name).map(|(_, text)| text)
}

/// Text value of custom property `name`.
pub fn get(package: &Package, name: &str) -> Option<String> {
    read(package.xml(&part_path(package))?, name)
}

/// Typed value of custom property `name`.
pub fn get_value(package: &Package, name: &str) -> Option<PropertyValue> {
    let (kind, text) = read_raw(package.xml(&part_path(package))?, name)?;
    match PropertyValue::from_xml_string(&kind, &text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Custom property '{}': {}", name, e);
            None
        },
    }
}

/// An empty `<Properties>` root.
pub fn empty_properties() -> Element {
    Element::new("Properties")
        .with_attr("xmlns", namespace::CUSTOM_PROPERTIES)
        .with_attr("xmlns:vt", namespace::DOC_PROPS_VTYPES)
}

/// Prefix bound to the variant-types namespace on `root`, declaring `vt`
/// when there is none.
fn vtypes_prefix(root: &mut Element) -> String {
    let declared = root.attributes.iter().find_map(|(k, v)| {
        (v == namespace::DOC_PROPS_VTYPES)
            .then(|| k.strip_prefix("xmlns:"))
            .flatten()
            .map(str::to_string)
    });
    match declared {
        Some(prefix) => prefix,
        None => {
            root.set_attr("xmlns:vt", namespace::DOC_PROPS_VTYPES);
            "vt".to_string()
        },
    }
}

fn value_wrapper(vt: &str, value: &PropertyValue) -> Element {
    Element::new(qualified(Some(vt), value.element_name())).with_text(value.to_xml_string())
}

/// Copy of `root` with property `name` set to `value`.
///
/// The property element's prefix is normalized to the prefix of `root`.
/// Returns `None` when an existing property is malformed and
/// `preserve_existing` asks not to overwrite it.
pub fn with_property(
    root: &Element,
    name: &str,
    value: &PropertyValue,
    preserve_existing: bool,
) -> Option<Element> {
    let mut updated = root.clone();
    let vt = vtypes_prefix(&mut updated);
    let property_name = qualified(updated.prefix(), "property");
    let wrapper_el = value_wrapper(&vt, value);

    let position = updated.children.iter().position(|c| {
        c.as_element()
            .is_some_and(|p| matches_local(&p.name, "property") && p.attr("name") == Some(name))
    });
    match position {
        Some(i) => {
            let property = updated.children[i].as_element_mut()?;
            if wrapper(property).is_none() {
                if preserve_existing {
                    warn!("Custom property '{}' is malformed, leaving it untouched", name);
                    return None;
                }
                debug!("Rebuilding malformed custom property '{}'", name);
            }
            property.name = property_name;
            property.children = vec![XmlNode::from(wrapper_el)];
        },
        None => {
            let pid = next_pid(&updated);
            updated.push(
                Element::new(property_name)
                    .with_attr("fmtid", FORMAT_ID)
                    .with_attr("pid", format_int(pid))
                    .with_attr("name", name)
                    .with_child(wrapper_el),
            );
        },
    }
    Some(updated)
}

/// Lowest `pid` above every id in use, at least [`FIRST_PID`].
fn next_pid(root: &Element) -> i64 {
    root.elements()
        .filter(|p| matches_local(&p.name, "property"))
        .filter_map(|p| p.attr("pid").and_then(parse_int))
        .map(|pid| pid + 1)
        .fold(FIRST_PID, i64::max)
}

/// Set custom property `name` to a string value.
///
/// Creates the part (with its package relationship and content-type
/// override) when missing. Returns `false` when nothing was written.
pub fn set(package: &mut Package, name: &str, value: &str, preserve_existing: bool) -> bool {
    set_value(package, name, &PropertyValue::from(value), preserve_existing)
}

/// Typed variant of [`set`].
pub fn set_value(
    package: &mut Package,
    name: &str,
    value: &PropertyValue,
    preserve_existing: bool,
) -> bool {
    let path = part_path(package);
    let current = match package.xml(&path) {
        Some(root) if matches_local(&root.name, "Properties") => root.clone(),
        Some(root) => {
            warn!("Custom properties root is <{}>, not Properties", root.name);
            if preserve_existing {
                return false;
            }
            empty_properties()
        },
        None if package.contains(&path) => {
            warn!("Custom properties part '{}' is not readable XML", path);
            if preserve_existing {
                return false;
            }
            empty_properties()
        },
        None => {
            debug!("Creating custom properties part '{}'", path);
            empty_properties()
        },
    };

    let Some(updated) = with_property(&current, name, value, preserve_existing) else {
        return false;
    };
    let created = !package.contains(&path);
    package.insert_xml(path.clone(), updated);
    if created {
        package.relate("", relationship_type::CUSTOM_PROPERTIES, &path);
        package.register_content_type(&path, content_type::OFC_CUSTOM_PROPERTIES);
    }
    true
}
