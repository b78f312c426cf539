/// Comment anchors and export-time comment cleanup.
///
/// The comment bodies themselves live in `word/comments.xml` (plus the three
/// Microsoft extension parts) and are not part of the Document Tree; the
/// tree only carries the range markers and references that anchor them.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{read_attrs, write_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::Translator;
use crate::ooxml::opc::Package;
use crate::ooxml::opc::constants::{part_name, relationship_type};
use crate::ooxml::opc::packuri::resolve_target;
use log::debug;

pub const RANGE_START: Translator = Translator {
    encode: encode_range_start,
    decode: decode_range_start,
};

pub const RANGE_END: Translator = Translator {
    encode: encode_range_end,
    decode: decode_range_end,
};

pub const REFERENCE: Translator = Translator {
    encode: encode_reference,
    decode: decode_reference,
};

const MARKER_ATTRS: &[(&str, &str)] = &[("id", "id")];

fn encode_marker(element: &Element, kind: &str) -> Option<DocNode> {
    let mut node = Node::new(kind);
    read_attrs(element, &mut node, MARKER_ATTRS);
    Some(node.into())
}

fn decode_marker(node: &Node, ctx: &DecodeContext, local: &str) -> Element {
    let mut el = Element::new(ctx.w(local));
    write_attrs(&mut el, node, MARKER_ATTRS, ctx.wml());
    el
}

fn encode_range_start(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    encode_marker(element, kind::COMMENT_RANGE_START)
}

fn decode_range_start(node: &Node, ctx: &mut DecodeContext) -> Element {
    decode_marker(node, ctx, "commentRangeStart")
}

fn encode_range_end(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    encode_marker(element, kind::COMMENT_RANGE_END)
}

fn decode_range_end(node: &Node, ctx: &mut DecodeContext) -> Element {
    decode_marker(node, ctx, "commentRangeEnd")
}

fn encode_reference(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    encode_marker(element, kind::COMMENT_REFERENCE)
}

fn decode_reference(node: &Node, ctx: &mut DecodeContext) -> Element {
    decode_marker(node, ctx, "commentReference")
}

/// Whether any comment marker remains in `tree`, including markers inside
/// opaque content.
pub fn has_comment_markers(tree: &DocNode) -> bool {
    tree.any(&|n| match n {
        DocNode::Known(node) => kind::COMMENT_MARKERS.contains(&node.kind.as_str()),
        DocNode::Opaque(el) => {
            is_marker(el) || el.any_descendant(&is_marker)
        },
    })
}

fn is_marker(el: &Element) -> bool {
    el.is("commentRangeStart") || el.is("commentRangeEnd") || el.is("commentReference")
}

/// Drop the comment parts of a document whose tree no longer references
/// any comment.
///
/// Removes the four comment parts (at their well-known names and wherever
/// a comment-typed relationship of `document_part` points), their
/// content-type overrides, and only the comment-typed relationships. Other
/// relationships are kept even if they share a target name.
///
/// Returns the number of parts removed.
pub fn prune_comment_parts(package: &mut Package, document_part: &str) -> usize {
    let rels = package.relationships(document_part);
    let is_comment = |rel_type: &str| relationship_type::COMMENT_TYPES.contains(&rel_type);

    let mut doomed: Vec<String> = part_name::COMMENT_PARTS.iter().map(|p| p.to_string()).collect();
    for rel in rels.iter().filter(|r| is_comment(&r.rel_type) && !r.is_external()) {
        let path = resolve_target(document_part, &rel.target);
        if !doomed.contains(&path) {
            doomed.push(path);
        }
    }

    let mut removed = 0;
    for path in &doomed {
        if package.remove(path) {
            debug!("Pruned comment part '{}'", path);
            removed += 1;
        }
        package.unregister_content_type(path);
    }

    let kept: Vec<_> = rels.iter().filter(|r| !is_comment(&r.rel_type)).cloned().collect();
    if kept.len() != rels.len() {
        debug!(
            "Pruned {} comment relationship(s) from '{}'",
            rels.len() - kept.len(),
            document_part
        );
        package.set_relationships(document_part, &kept);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::{PartRecord, Relationship};

    fn package_with_comments() -> Package {
        let mut package = Package::from_records([
            PartRecord::new("word/document.xml", "<w:document><w:body/></w:document>"),
            PartRecord::new("word/comments.xml", "<w:comments/>"),
            PartRecord::new("word/commentsExtended.xml", "<w15:commentsEx/>"),
            PartRecord::new("word/header1.xml", "<w:hdr/>"),
        ]);
        package.set_relationships(
            "word/document.xml",
            &[
                Relationship::new("rId1", rt::COMMENTS, "comments.xml"),
                Relationship::new("rId2", rt::COMMENTS_EXTENDED, "commentsExtended.xml"),
                Relationship::new("rId3", rt::HEADER, "header1.xml"),
                Relationship::new("rId4", rt::HEADER, "comments.xml"),
            ],
        );
        package.register_content_type("word/comments.xml", ct::WML_COMMENTS);
        package.register_content_type("word/commentsExtended.xml", ct::WML_COMMENTS_EXTENDED);
        package
    }

    #[test]
    fn test_prune_only_comment_typed_relationships() {
        let mut package = package_with_comments();
        assert_eq!(prune_comment_parts(&mut package, "word/document.xml"), 2);
        assert!(!package.contains("word/comments.xml"));
        assert!(!package.contains("word/commentsExtended.xml"));
        assert!(package.contains("word/header1.xml"));

        let ids: Vec<_> = package
            .relationships("word/document.xml")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["rId3", "rId4"]);

        let types = package.xml("[Content_Types].xml").unwrap();
        assert!(types.children.is_empty());
    }

    #[test]
    fn test_marker_detection() {
        let tree = DocNode::Known(Node::new(kind::DOC).with_child(Node::new(kind::PARAGRAPH)));
        assert!(!has_comment_markers(&tree));

        let opaque = DocNode::Known(Node::new(kind::DOC).with_child(DocNode::Opaque(
            Element::new("w:sdt").with_child(Element::new("w:commentReference")),
        )));
        assert!(has_comment_markers(&opaque));

        let known = DocNode::Known(
            Node::new(kind::DOC).with_child(Node::new(kind::COMMENT_RANGE_START).with_attr("id", "0")),
        );
        assert!(has_comment_markers(&known));
    }
}
