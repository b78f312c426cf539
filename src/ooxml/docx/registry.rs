//! Translator registry.
//!
//! Two compile-time maps bind every supported element to its translator: one
//! keyed by the element's local name (encode dispatch) and one keyed by the
//! Document Tree kind (decode dispatch). Anything missing from the maps is
//! carried through unchanged.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::node::{DocNode, Node};
use crate::ooxml::docx::{
    bookmark, comment, document, drawing, field, hyperlink, paragraph, revision, table,
};
use log::{debug, warn};
use phf::phf_map;

/// XML → Document Tree. `None` drops the element from the tree.
pub type EncodeFn = fn(&Element, &mut EncodeContext) -> Option<DocNode>;

/// Document Tree → XML.
pub type DecodeFn = fn(&Node, &mut DecodeContext) -> Element;

/// Encode/decode pair for one element type.
#[derive(Clone, Copy)]
pub struct Translator {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

/// Translators by WordprocessingML local name.
static BY_ELEMENT: phf::Map<&'static str, Translator> = phf_map! {
    "body" => document::BODY,
    "p" => paragraph::PARAGRAPH,
    "r" => paragraph::RUN,
    "t" => paragraph::TEXT,
    "delText" => paragraph::TEXT,
    "tab" => paragraph::TAB,
    "br" => paragraph::LINE_BREAK,
    "instrText" => field::FIELD_INSTRUCTION,
    "hyperlink" => hyperlink::LINK,
    "bookmarkStart" => bookmark::BOOKMARK_START,
    "bookmarkEnd" => bookmark::BOOKMARK_END,
    "commentRangeStart" => comment::RANGE_START,
    "commentRangeEnd" => comment::RANGE_END,
    "commentReference" => comment::REFERENCE,
    "ins" => revision::TRACK_INSERT,
    "del" => revision::TRACK_DELETE,
    "drawing" => drawing::IMAGE,
    "tbl" => table::TABLE,
    "tr" => table::ROW,
    "tc" => table::CELL,
};

/// Translators by Document Tree kind.
static BY_KIND: phf::Map<&'static str, Translator> = phf_map! {
    "doc" => document::BODY,
    "paragraph" => paragraph::PARAGRAPH,
    "run" => paragraph::RUN,
    "text" => paragraph::TEXT,
    "tab" => paragraph::TAB,
    "lineBreak" => paragraph::LINE_BREAK,
    "fieldInstruction" => field::FIELD_INSTRUCTION,
    "link" => hyperlink::LINK,
    "bookmarkStart" => bookmark::BOOKMARK_START,
    "bookmarkEnd" => bookmark::BOOKMARK_END,
    "commentRangeStart" => comment::RANGE_START,
    "commentRangeEnd" => comment::RANGE_END,
    "commentReference" => comment::REFERENCE,
    "trackInsert" => revision::TRACK_INSERT,
    "trackDelete" => revision::TRACK_DELETE,
    "image" => drawing::IMAGE,
    "table" => table::TABLE,
    "tableRow" => table::ROW,
    "tableCell" => table::CELL,
};

/// Translator for an element, if it is a supported WordprocessingML element.
pub fn translator_for_element(element: &Element, ctx: &EncodeContext) -> Option<&'static Translator> {
    if !ctx.is_wml(element) {
        return None;
    }
    BY_ELEMENT.get(element.local_name())
}

/// Translator for a Document Tree kind.
#[inline]
pub fn translator_for_kind(kind: &str) -> Option<&'static Translator> {
    BY_KIND.get(kind)
}

/// Encode one element, falling back to an opaque node.
pub fn encode_element(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    match translator_for_element(element, ctx) {
        Some(t) => (t.encode)(element, ctx),
        None => {
            debug!("Passing through unrecognized element <{}>", element.name);
            Some(DocNode::Opaque(element.clone()))
        },
    }
}

/// Encode the element children of `parent`, skipping property containers
/// named in `skip` (they are captured as attributes by the caller).
pub fn encode_children(parent: &Element, ctx: &mut EncodeContext, skip: &[&str]) -> Vec<DocNode> {
    let mut out = Vec::with_capacity(parent.children.len());
    for child in parent.elements() {
        if skip.iter().any(|s| child.is(s)) {
            continue;
        }
        if let Some(node) = encode_element(child, ctx) {
            out.push(node);
        }
    }
    out
}

/// Decode one Document Tree node.
///
/// Opaque nodes yield their original subtree. A known node whose kind has no
/// translator is replaced by its decoded children.
pub fn decode_node(node: &DocNode, ctx: &mut DecodeContext) -> Vec<Element> {
    match node {
        DocNode::Opaque(element) => vec![element.clone()],
        DocNode::Known(n) => match translator_for_kind(&n.kind) {
            Some(t) => vec![(t.decode)(n, ctx)],
            None => {
                warn!("No translator for node kind '{}', decoding its content in place", n.kind);
                decode_children(&n.content, ctx)
            },
        },
    }
}

/// Decode a list of nodes in order.
pub fn decode_children(nodes: &[DocNode], ctx: &mut DecodeContext) -> Vec<Element> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.extend(decode_node(node, ctx));
    }
    out
}

/// Decode `nodes` and append the results to `parent`.
pub(crate) fn decode_into(parent: &mut Element, nodes: &[DocNode], ctx: &mut DecodeContext) {
    for element in decode_children(nodes, ctx) {
        parent.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::parse;
    use crate::config::ConvertOptions;
    use crate::ooxml::docx::node::kind;
    use crate::ooxml::opc::Package;

    #[test]
    fn test_maps_agree() {
        for k in BY_KIND.keys() {
            assert!(translator_for_kind(k).is_some());
        }
        assert_eq!(BY_ELEMENT.len(), BY_KIND.len() + 1);
        assert!(translator_for_kind("sectionBreak").is_none());
    }

    #[test]
    fn test_unrecognized_element_passes_through() {
        let package = Package::new();
        let options = ConvertOptions::default();
        let mut ctx = EncodeContext::new(&package, "word/document.xml", &options);
        let sect = parse(r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr>"#).unwrap();
        assert_eq!(encode_element(&sect, &mut ctx), Some(DocNode::Opaque(sect.clone())));

        // Same local name in a foreign namespace is not a paragraph.
        let math = parse("<m:r><m:t>x</m:t></m:r>").unwrap();
        assert!(matches!(encode_element(&math, &mut ctx), Some(DocNode::Opaque(_))));
    }

    #[test]
    fn test_unknown_kind_decodes_children_in_place() {
        let options = ConvertOptions::default();
        let mut ctx = DecodeContext::new(Vec::new(), &options, Some("w".to_string()));
        let node = DocNode::Known(
            Node::new("sectionGroup")
                .with_child(Node::new(kind::PARAGRAPH))
                .with_child(DocNode::Opaque(Element::new("w:sectPr"))),
        );
        let out = decode_node(&node, &mut ctx);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "w:p");
        assert_eq!(out[1].name, "w:sectPr");
    }
}
