//! Owned element tree for one package part.
use super::name::{local_name, matches_local, prefix};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Attribute storage. Most OOXML elements carry four attributes or fewer.
pub type Attributes = SmallVec<[(String, String); 4]>;

/// A child of an [`Element`]: either a nested element or a text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum XmlNode {
    Element(Element),
    Text { text: String },
}

impl XmlNode {
    /// Build a text leaf.
    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        XmlNode::Text { text: s.into() }
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text { .. } => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text { .. } => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlNode::Text { text } => Some(text),
            XmlNode::Element(_) => None,
        }
    }
}

impl From<Element> for XmlNode {
    fn from(e: Element) -> Self {
        XmlNode::Element(e)
    }
}

/// A namespaced XML element.
///
/// The name keeps its prefix exactly as it appeared in the source
/// (`"w:p"`, `"Properties"`, `"op:property"`). Attribute order is preserved
/// so that untouched subtrees serialize byte-for-byte as they were parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder that appends a text leaf.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::text(text));
        self
    }

    /// Local part of this element's name.
    #[inline]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Prefix of this element's name, if any.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        prefix(&self.name)
    }

    /// Whether this element's name refers to `local` (prefix-tolerant).
    #[inline]
    pub fn is(&self, local: &str) -> bool {
        matches_local(&self.name, local)
    }

    /// Attribute by exact key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by local name, ignoring any prefix on the key.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| matches_local(k, local))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place when the key exists.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Remove an attribute by exact key, returning its value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Append a child node.
    #[inline]
    pub fn push(&mut self, child: impl Into<XmlNode>) {
        self.children.push(child.into());
    }

    /// Iterate over element children, skipping text leaves.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Mutable iteration over element children.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First element child whose name refers to `local`.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    /// Mutable access to the first element child named `local`.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// All element children named `local`.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(local))
    }

    /// `@w:val` (any prefix) of the child named `local`.
    pub fn child_val(&self, local: &str) -> Option<&str> {
        self.child(local).and_then(|c| c.attr_local("val"))
    }

    /// Replace the first child named `local`, or append `replacement`.
    pub fn replace_child(&mut self, local: &str, replacement: Element) {
        match self.child_mut(local) {
            Some(slot) => *slot = replacement,
            None => self.children.push(XmlNode::Element(replacement)),
        }
    }

    /// Remove every element child named `local`. Returns how many were removed.
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|c| !matches!(c, XmlNode::Element(e) if e.is(local)));
        before - self.children.len()
    }

    /// Concatenation of the direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text { text } = child {
                out.push_str(text);
            }
        }
        out
    }

    /// Whether any element in this subtree satisfies `pred`.
    pub fn any_descendant(&self, pred: &dyn Fn(&Element) -> bool) -> bool {
        self.elements().any(|e| pred(e) || e.any_descendant(pred))
    }

    /// Depth-first search for the first descendant named `local`.
    pub fn find_descendant(&self, local: &str) -> Option<&Element> {
        for e in self.elements() {
            if e.is(local) {
                return Some(e);
            }
            if let Some(found) = e.find_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable depth-first search for the first descendant named `local`.
    pub fn find_descendant_mut(&mut self, local: &str) -> Option<&mut Element> {
        for e in self.elements_mut() {
            if e.is(local) {
                return Some(e);
            }
            if let Some(found) = e.find_descendant_mut(local) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("w:p")
            .with_attr("w14:paraId", "1A2B3C4D")
            .with_child(
                Element::new("w:pPr").with_child(Element::new("w:pStyle").with_attr("w:val", "Heading1")),
            )
            .with_child(Element::new("w:r").with_child(Element::new("w:t").with_text("Hello")))
    }

    #[test]
    fn test_attribute_access() {
        let mut p = sample();
        assert_eq!(p.attr("w14:paraId"), Some("1A2B3C4D"));
        assert_eq!(p.attr_local("paraId"), Some("1A2B3C4D"));
        p.set_attr("w14:paraId", "00000001");
        assert_eq!(p.attributes.len(), 1);
        assert_eq!(p.remove_attr("w14:paraId").as_deref(), Some("00000001"));
        assert!(p.attributes.is_empty());
    }

    #[test]
    fn test_child_lookup() {
        let p = sample();
        assert_eq!(p.child("pPr").and_then(|ppr| ppr.child_val("pStyle")), Some("Heading1"));
        assert_eq!(p.find_descendant("t").map(Element::text).as_deref(), Some("Hello"));
        assert!(p.any_descendant(&|e| e.is("r")));
        assert!(p.child("tbl").is_none());
    }

    #[test]
    fn test_replace_and_remove_children() {
        let mut p = sample();
        p.replace_child("pPr", Element::new("w:pPr"));
        assert!(p.child("pPr").is_some_and(|e| e.children.is_empty()));
        assert_eq!(p.remove_children("r"), 1);
        assert_eq!(p.elements().count(), 1);
    }
}
