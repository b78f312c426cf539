//! State threaded through a translator walk.
use crate::common::xml::{Element, qualified};
use crate::config::ConvertOptions;
use crate::ooxml::docx::styles::{self, TableStyle};
use crate::ooxml::docx::table::TableFrame;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::{Package, Relationship, merge};

/// Prefix bound to the WordprocessingML main namespace on `root`.
///
/// `None` when the namespace is the default one; `w` when the root does
/// not declare it at all.
pub(crate) fn wml_prefix(root: &Element) -> Option<String> {
    for (key, value) in &root.attributes {
        if value != namespace::WML_MAIN {
            continue;
        }
        if key == "xmlns" {
            return None;
        }
        if let Some(p) = key.strip_prefix("xmlns:") {
            return Some(p.to_string());
        }
    }
    Some("w".to_string())
}

/// Prefix bound to the officeDocument relationships namespace on `root`,
/// `r` when the root does not declare one.
pub(crate) fn rel_prefix(root: &Element) -> String {
    root.attributes
        .iter()
        .filter(|(_, value)| value == namespace::OFC_RELATIONSHIPS)
        .find_map(|(key, _)| key.strip_prefix("xmlns:"))
        .unwrap_or("r")
        .to_string()
}

/// Context for encoding (XML → Document Tree).
pub struct EncodeContext<'a> {
    package: &'a Package,
    part: &'a str,
    rels: Vec<Relationship>,
    options: &'a ConvertOptions,
    wml: Option<String>,
    pub(crate) tables: Vec<TableFrame>,
}

impl<'a> EncodeContext<'a> {
    /// Context for translating the part `part` of `package`.
    pub fn new(package: &'a Package, part: &'a str, options: &'a ConvertOptions) -> Self {
        let wml = package
            .xml(part)
            .map(wml_prefix)
            .unwrap_or_else(|| Some("w".to_string()));
        Self {
            package,
            part,
            rels: package.relationships(part),
            options,
            wml,
            tables: Vec::new(),
        }
    }

    #[inline]
    pub fn package(&self) -> &'a Package {
        self.package
    }

    #[inline]
    pub fn part(&self) -> &str {
        self.part
    }

    #[inline]
    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    /// Relationship of the current part with the given id.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    /// Whether `element` lives in the WordprocessingML main namespace.
    #[inline]
    pub fn is_wml(&self, element: &Element) -> bool {
        element.prefix() == self.wml.as_deref()
    }
}

/// Context for decoding (Document Tree → XML).
///
/// Relationships needed by decoded content are merged into the part's list
/// as they are discovered.
pub struct DecodeContext<'a> {
    rels: Vec<Relationship>,
    changed: bool,
    options: &'a ConvertOptions,
    wml: Option<String>,
    rel: String,
    styles: Option<&'a Element>,
    pub(crate) tables: Vec<TableFrame>,
}

impl<'a> DecodeContext<'a> {
    /// Context starting from the relationships the target part already has.
    pub fn new(rels: Vec<Relationship>, options: &'a ConvertOptions, wml: Option<String>) -> Self {
        Self {
            rels,
            changed: false,
            options,
            wml,
            rel: "r".to_string(),
            styles: None,
            tables: Vec::new(),
        }
    }

    /// Use `prefix` for relationship id attributes.
    pub fn with_rel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rel = prefix.into();
        self
    }

    /// Resolve table styles against `styles`, the styles part root.
    pub fn with_styles(mut self, styles: Option<&'a Element>) -> Self {
        self.styles = styles;
        self
    }

    #[inline]
    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    /// Qualified relationships-namespace name for `local`.
    #[inline]
    pub fn r(&self, local: &str) -> String {
        qualified(Some(&self.rel), local)
    }

    /// Table style `style_id` with its base style merged in.
    pub fn table_style(&self, style_id: &str) -> Option<TableStyle> {
        styles::table_style(self.styles?, style_id)
    }

    /// Prefix used for WordprocessingML names.
    #[inline]
    pub fn wml(&self) -> Option<&str> {
        self.wml.as_deref()
    }

    /// Qualified WordprocessingML name for `local`.
    #[inline]
    pub fn w(&self, local: &str) -> String {
        qualified(self.wml.as_deref(), local)
    }

    /// Relationship with the given id.
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    /// First relationship of `rel_type` pointing at `target`.
    pub fn find_relationship(&self, rel_type: &str, target: &str) -> Option<&Relationship> {
        self.rels
            .iter()
            .find(|r| r.rel_type == rel_type && r.target == target)
    }

    /// Register `rel` through the merge algorithm and return its final id.
    pub fn register(&mut self, rel: Relationship) -> Option<String> {
        let outcome = merge(&self.rels, std::slice::from_ref(&rel));
        let id = outcome.assigned.into_iter().next().flatten();
        let merged = outcome.relationships.into_owned();
        if merged.len() != self.rels.len() {
            self.rels = merged;
            self.changed = true;
        }
        id
    }

    /// Final relationship list, and whether it differs from the initial one.
    pub fn into_relationships(self) -> (Vec<Relationship>, bool) {
        (self.rels, self.changed)
    }
}
