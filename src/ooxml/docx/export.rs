/// Export pipeline: writes a Document Tree back into a package.
///
/// The tree replaces the body of the main document part. Relationships
/// registered while decoding are merged into the document's relationships
/// part, and comment parts are dropped once no comment marker remains.
use crate::common::error::Result;
use crate::common::xml::{Element, XmlNode};
use crate::config::ConvertOptions;
use crate::ooxml::docx::comment::{has_comment_markers, prune_comment_parts};
use crate::ooxml::docx::context::{DecodeContext, rel_prefix, wml_prefix};
use crate::ooxml::docx::document::replace_body;
use crate::ooxml::docx::node::{DocNode, kind};
use crate::ooxml::docx::registry::decode_node;
use crate::ooxml::docx::styles::styles_part;
use crate::ooxml::opc::constants::content_type;
use crate::ooxml::opc::packuri::CONTENT_TYPES_PART;
use crate::ooxml::opc::{Package, content_types};
use log::debug;

/// Write `tree` into `package` as the body of `document_part`.
///
/// Fails only when the document part itself is missing or unparseable.
pub fn apply(
    package: &mut Package,
    document_part: &str,
    tree: &DocNode,
    options: &ConvertOptions,
) -> Result<()> {
    let document = package.require_xml(document_part)?;
    let styles = styles_part(package, document_part);

    let mut ctx = DecodeContext::new(
        package.relationships(document_part),
        options,
        wml_prefix(document),
    )
    .with_rel_prefix(rel_prefix(document))
    .with_styles(package.xml(&styles));
    let body = decode_body(tree, &mut ctx);
    let root = replace_body(document, body);
    let (rels, changed) = ctx.into_relationships();
    package.insert_xml(document_part, root);

    if changed {
        debug!("Writing {} relationship(s) for '{}'", rels.len(), document_part);
        package.set_relationships(document_part, &rels);
        if let Some(types) = package.xml_mut(CONTENT_TYPES_PART) {
            content_types::ensure_default(types, "rels", content_type::OPC_RELATIONSHIPS);
        }
    }

    if options.prune_comment_parts && !has_comment_markers(tree) {
        let removed = prune_comment_parts(package, document_part);
        if removed > 0 {
            debug!("Removed {} comment part(s) no longer referenced", removed);
        }
    }
    Ok(())
}

/// Decode the tree root into a `w:body`.
///
/// A root that is not a `doc` node is wrapped in a fresh body.
fn decode_body(tree: &DocNode, ctx: &mut DecodeContext) -> Element {
    let mut decoded = decode_node(tree, ctx);
    if tree.kind() == Some(kind::DOC) && decoded.len() == 1 {
        if let Some(body) = decoded.pop() {
            return body;
        }
    }
    let mut body = Element::new(ctx.w("body"));
    body.children.extend(decoded.into_iter().map(XmlNode::from));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::ooxml::docx::node::Node;
    use crate::ooxml::opc::constants::{part_name, relationship_type as rt};
    use crate::ooxml::opc::{PartRecord, Relationship};

    const DOC: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:commentRangeStart w:id="0"/><w:r><w:t>Hi</w:t></w:r><w:commentRangeEnd w:id="0"/></w:p></w:body></w:document>"#;

    const RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="comments.xml"/></Relationships>"#;

    fn package() -> Package {
        Package::from_records([
            PartRecord::new(part_name::DOCUMENT, DOC),
            PartRecord::new("word/_rels/document.xml.rels", RELS),
            PartRecord::new(part_name::COMMENTS, "<w:comments/>"),
        ])
    }

    fn paragraph(text: &str) -> DocNode {
        Node::new(kind::PARAGRAPH)
            .with_child(Node::new(kind::RUN).with_child(Node::new(kind::TEXT).with_text(text)))
            .into()
    }

    #[test]
    fn test_comments_pruned_when_markers_gone() {
        let mut package = package();
        let tree: DocNode = Node::new(kind::DOC).with_child(paragraph("Hi")).into();
        apply(&mut package, part_name::DOCUMENT, &tree, &ConvertOptions::default()).unwrap();

        assert!(!package.contains(part_name::COMMENTS));
        let rels = package.relationships(part_name::DOCUMENT);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].rel_type, rt::HEADER);
    }

    #[test]
    fn test_pruning_can_be_disabled() {
        let mut package = package();
        let tree: DocNode = Node::new(kind::DOC).into();
        let options = ConvertOptions::default().with_prune_comment_parts(false);
        apply(&mut package, part_name::DOCUMENT, &tree, &options).unwrap();
        assert!(package.contains(part_name::COMMENTS));
    }

    #[test]
    fn test_new_link_registers_relationship() {
        let mut package = package();
        let link = Node::new(kind::LINK)
            .with_attr("href", "https://example.com")
            .with_child(Node::new(kind::RUN).with_child(Node::new(kind::TEXT).with_text("x")));
        let tree: DocNode = Node::new(kind::DOC)
            .with_child(Node::new(kind::PARAGRAPH).with_child(link))
            .into();
        apply(&mut package, part_name::DOCUMENT, &tree, &ConvertOptions::default()).unwrap();

        let rels = package.relationships(part_name::DOCUMENT);
        let link_rel: Vec<&Relationship> = rels.iter().filter(|r| r.rel_type == rt::HYPERLINK).collect();
        assert_eq!(link_rel.len(), 1);
        assert_eq!(link_rel[0].id, "rId3");
        let body = package.xml(part_name::DOCUMENT).unwrap().child("body").unwrap();
        let hyperlink = body.find_descendant("hyperlink").unwrap();
        assert_eq!(hyperlink.attr("r:id"), Some("rId3"));
    }

    #[test]
    fn test_non_doc_root_is_wrapped() {
        let mut package = package();
        apply(&mut package, part_name::DOCUMENT, &paragraph("solo"), &ConvertOptions::default()).unwrap();
        let body = package.xml(part_name::DOCUMENT).unwrap().child("body").unwrap();
        assert_eq!(body.elements().count(), 1);
        assert_eq!(body.find_descendant("t").unwrap().text(), "solo");
    }

    #[test]
    fn test_missing_document_part() {
        let mut package = Package::new();
        let err = apply(&mut package, part_name::DOCUMENT, &paragraph("x"), &ConvertOptions::default());
        assert!(matches!(err, Err(Error::PartNotFound(_))));
    }
}
