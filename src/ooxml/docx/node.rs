/// Document Tree: the typed, editor-facing representation of a document body.
///
/// A node is either [`DocNode::Known`], produced by a registered translator,
/// or [`DocNode::Opaque`], which carries an element subtree that no
/// translator understands so that it can be written back unchanged.
use crate::common::xml::Element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map of a [`Node`].
pub type Attrs = BTreeMap<String, Value>;

/// Attribute value of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Original property subtree kept for lossless round trip
    Xml(Element),
}

impl Value {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_xml(&self) -> Option<&Element> {
        match self {
            Value::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Element> for Value {
    fn from(e: Element) -> Self {
        Value::Xml(e)
    }
}

/// A node produced by a translator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Builder that sets an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builder that appends a child node.
    pub fn with_child(mut self, child: impl Into<DocNode>) -> Self {
        self.content.push(child.into());
        self
    }

    /// Builder that sets the text payload.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute only when a value is present.
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(v) = value {
            self.attrs.insert(key.to_string(), v.into());
        }
    }

    #[inline]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    #[inline]
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    #[inline]
    pub fn int_attr(&self, key: &str) -> Option<i64> {
        self.attrs.get(key).and_then(Value::as_int)
    }

    #[inline]
    pub fn bool_attr(&self, key: &str) -> bool {
        self.attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    #[inline]
    pub fn xml_attr(&self, key: &str) -> Option<&Element> {
        self.attrs.get(key).and_then(Value::as_xml)
    }
}

/// A Document Tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", content = "data", rename_all = "lowercase")]
pub enum DocNode {
    Known(Node),
    /// Subtree with no registered translator, carried verbatim
    Opaque(Element),
}

impl DocNode {
    /// Kind of a known node, `None` for opaque content.
    pub fn kind(&self) -> Option<&str> {
        match self {
            DocNode::Known(node) => Some(&node.kind),
            DocNode::Opaque(_) => None,
        }
    }

    #[inline]
    pub fn as_known(&self) -> Option<&Node> {
        match self {
            DocNode::Known(node) => Some(node),
            DocNode::Opaque(_) => None,
        }
    }

    /// Whether this node or any descendant satisfies `pred`.
    pub fn any(&self, pred: &dyn Fn(&DocNode) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            DocNode::Known(node) => node.content.iter().any(|c| c.any(pred)),
            DocNode::Opaque(_) => false,
        }
    }

    /// Concatenated text of every `text` node below this one.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &DocNode, out: &mut String) {
    if let DocNode::Known(n) = node {
        if n.kind == kind::TEXT
            && let Some(text) = &n.text
        {
            out.push_str(text);
        }
        for child in &n.content {
            collect_text(child, out);
        }
    }
}

impl From<Node> for DocNode {
    fn from(node: Node) -> Self {
        DocNode::Known(node)
    }
}

impl From<Element> for DocNode {
    fn from(e: Element) -> Self {
        DocNode::Opaque(e)
    }
}

/// Node kinds emitted by the built-in translators.
pub mod kind {
    pub const DOC: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const RUN: &str = "run";
    pub const TEXT: &str = "text";
    pub const FIELD_INSTRUCTION: &str = "fieldInstruction";
    pub const TAB: &str = "tab";
    pub const LINE_BREAK: &str = "lineBreak";
    pub const LINK: &str = "link";
    pub const BOOKMARK_START: &str = "bookmarkStart";
    pub const BOOKMARK_END: &str = "bookmarkEnd";
    pub const COMMENT_RANGE_START: &str = "commentRangeStart";
    pub const COMMENT_RANGE_END: &str = "commentRangeEnd";
    pub const COMMENT_REFERENCE: &str = "commentReference";
    pub const TRACK_INSERT: &str = "trackInsert";
    pub const TRACK_DELETE: &str = "trackDelete";
    pub const IMAGE: &str = "image";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const TABLE_CELL: &str = "tableCell";

    /// Kinds whose presence keeps the comment parts alive on export.
    pub const COMMENT_MARKERS: [&str; 3] =
        [COMMENT_RANGE_START, COMMENT_RANGE_END, COMMENT_REFERENCE];
}
