/// Relationship records and the relationship merge algorithm.
///
/// A relationships part (`*.rels`) lists `id → (type, target)` references
/// scoped to one source part. New content produced during export (links,
/// images, comment parts) is registered against an existing list with
/// [`merge`], which guarantees id uniqueness within the part.
use crate::common::xml::Element;
use crate::ooxml::opc::constants::{namespace, relationship_type, target_mode};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target reference - a part reference relative to the source, or an URL
    pub target: String,
    /// `Some("External")` for external targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_mode: Option<String>,
}

impl Relationship {
    /// Create an internal relationship.
    pub fn new(id: impl Into<String>, rel_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode: None,
        }
    }

    /// Create an external relationship (`TargetMode="External"`).
    pub fn external(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            target_mode: Some(target_mode::EXTERNAL.to_string()),
            ..Self::new(id, rel_type, target)
        }
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some(target_mode::EXTERNAL)
    }

    /// Numeric suffix of an `rId<digits>` id, 0 for anything else.
    #[inline]
    pub fn numeric_id(&self) -> u32 {
        numeric_id(&self.id).unwrap_or(0)
    }

    fn from_element(element: &Element) -> Self {
        Self {
            id: element.attr("Id").unwrap_or_default().to_string(),
            rel_type: element.attr("Type").unwrap_or_default().to_string(),
            target: element.attr("Target").unwrap_or_default().to_string(),
            target_mode: element.attr("TargetMode").map(str::to_string),
        }
    }

    fn to_element(&self, name: &str) -> Element {
        let mut element = Element::new(name);
        if !self.id.is_empty() {
            element.set_attr("Id", self.id.as_str());
        }
        if !self.rel_type.is_empty() {
            element.set_attr("Type", self.rel_type.as_str());
        }
        if !self.target.is_empty() {
            element.set_attr("Target", self.target.as_str());
        }
        if let Some(mode) = &self.target_mode {
            element.set_attr("TargetMode", mode.as_str());
        }
        element
    }
}

/// Parse the number out of an `rId<digits>` id.
///
/// ```
/// use quince::ooxml::opc::rel::numeric_id;
/// assert_eq!(numeric_id("rId12"), Some(12));
/// assert_eq!(numeric_id("rIdX"), None);
/// assert_eq!(numeric_id("rId"), None);
/// ```
pub fn numeric_id(id: &str) -> Option<u32> {
    let digits = id.strip_prefix("rId")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok()
}

fn format_id(n: u32) -> String {
    let mut buf = itoa::Buffer::new();
    let digits = buf.format(n);
    let mut id = String::with_capacity(3 + digits.len());
    id.push_str("rId");
    id.push_str(digits);
    id
}

/// Read the relationship list out of a parsed `.rels` root element.
///
/// Elements are matched by local name, so a prefixed
/// `<pr:Relationship>` is read the same as an unprefixed one. Entries with
/// missing attributes are kept (with empty fields) so existing parts round
/// trip unchanged.
pub fn relationships_from_element(root: &Element) -> Vec<Relationship> {
    root.children_named("Relationship")
        .map(Relationship::from_element)
        .collect()
}

/// Build a `.rels` root element from a relationship list.
///
/// When `template` is given, its name and attributes (namespace
/// declarations) are reused so that the part keeps its original prefixing.
pub fn relationships_to_element(rels: &[Relationship], template: Option<&Element>) -> Element {
    let mut root = match template {
        Some(t) => {
            let mut root = Element::new(t.name.as_str());
            root.attributes = t.attributes.clone();
            root
        },
        None => Element::new("Relationships").with_attr("xmlns", namespace::OPC_RELATIONSHIPS),
    };
    let child_name = crate::common::xml::qualified(root.prefix(), "Relationship");
    for rel in rels {
        root.push(rel.to_element(&child_name));
    }
    root
}

/// Result of [`merge`].
#[derive(Debug)]
pub struct MergeOutcome<'a> {
    /// Merged list: the existing entries in their original order followed
    /// by the newly added ones. Borrowed (the very same slice) when there
    /// was nothing to merge.
    pub relationships: Cow<'a, [Relationship]>,
    /// Final id for each incoming relationship, index-aligned with the
    /// input. Deduplicated entries report the id of the relationship they
    /// were folded into; dropped (invalid) entries report `None`.
    pub assigned: Vec<Option<String>>,
}

impl MergeOutcome<'_> {
    /// Whether the merge produced a new list.
    #[inline]
    pub fn changed(&self) -> bool {
        matches!(self.relationships, Cow::Owned(_))
    }
}

/// Merge `incoming` relationships into `existing`.
///
/// - Existing entries keep their order and ids; new entries are appended.
/// - Incoming entries without a type or target are dropped.
/// - An incoming entry whose target an existing entry already has is
///   skipped, unless
///   it is a hyperlink/header/footer relationship whose supplied id is longer
///   than six characters (an externally assigned collaboration id).
/// - A missing or already-used id is replaced by the first free `rId<N>`
///   searching upward from the largest numeric id seen so far.
///
/// Every id in the merged list is unique. With no incoming entries the
/// existing slice is returned as-is (borrowed, not copied).
pub fn merge<'a>(existing: &'a [Relationship], incoming: &[Relationship]) -> MergeOutcome<'a> {
    if incoming.is_empty() {
        return MergeOutcome {
            relationships: Cow::Borrowed(existing),
            assigned: Vec::new(),
        };
    }

    let mut used: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
    let mut largest = existing.iter().map(Relationship::numeric_id).max().unwrap_or(0);

    // Ids that will survive untouched must not be handed out to earlier
    // entries, whatever order the incoming list is processed in.
    let mut reserved: HashSet<&str> = HashSet::new();
    for rel in incoming.iter().filter(|r| is_complete(r)) {
        if !rel.id.is_empty() && !used.contains(&rel.id) {
            largest = largest.max(rel.numeric_id());
            reserved.insert(rel.id.as_str());
        }
    }

    let mut merged: Vec<Relationship> = existing.to_vec();
    let mut assigned = Vec::with_capacity(incoming.len());

    for rel in incoming {
        if !is_complete(rel) {
            warn!(
                "Dropping relationship '{}' without Type or Target",
                rel.id
            );
            assigned.push(None);
            continue;
        }

        let same_target = existing.iter().find(|r| r.target == rel.target);
        let exempt = relationship_type::COLLAB_ID_TYPES.contains(&rel.rel_type.as_str())
            && rel.id.len() > 6;
        if let Some(found) = same_target
            && !exempt
        {
            assigned.push(Some(found.id.clone()));
            continue;
        }

        let id = if rel.id.is_empty() || used.contains(&rel.id) {
            let mut n = largest.max(1);
            while used.contains(&format_id(n)) || reserved.contains(format_id(n).as_str()) {
                n += 1;
            }
            largest = n;
            let fresh = format_id(n);
            debug!("Relationship id '{}' reassigned to '{}'", rel.id, fresh);
            fresh
        } else {
            largest = largest.max(rel.numeric_id());
            rel.id.clone()
        };

        used.insert(id.clone());
        merged.push(Relationship {
            id: id.clone(),
            ..rel.clone()
        });
        assigned.push(Some(id));
    }

    MergeOutcome {
        relationships: Cow::Owned(merged),
        assigned,
    }
}

#[inline]
fn is_complete(rel: &Relationship) -> bool {
    !rel.rel_type.is_empty() && !rel.target.is_empty()
}
