/// Hyperlink translator (`w:hyperlink` ↔ `link`).
///
/// External links reference their URL through a relationship of the
/// containing part. On encode the URL is resolved into `href`; on decode the
/// relationship is looked up again, and registered through the relationship
/// merge when the link is new or its URL changed.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{read_attrs, write_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::{Translator, decode_into, encode_children};
use crate::ooxml::opc::Relationship;
use crate::ooxml::opc::constants::relationship_type;

pub const LINK: Translator = Translator {
    encode: encode_link,
    decode: decode_link,
};

const LINK_ATTRS: &[(&str, &str)] = &[
    ("rId", "id"),
    ("anchor", "anchor"),
    ("history", "history"),
    ("tooltip", "tooltip"),
    ("docLocation", "docLocation"),
    ("targetFrame", "tgtFrame"),
];

fn encode_link(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::LINK);
    read_attrs(element, &mut node, LINK_ATTRS);
    let href = node
        .str_attr("rId")
        .and_then(|id| ctx.relationship(id))
        .map(|rel| rel.target.clone());
    node.set_opt("href", href);
    node.content = encode_children(element, ctx, &[]);
    Some(node.into())
}

/// Final relationship id for a link node.
fn resolve_id(node: &Node, ctx: &mut DecodeContext) -> Option<String> {
    let supplied = node.str_attr("rId");
    let Some(href) = node.str_attr("href") else {
        return supplied.map(str::to_string);
    };
    if let Some(id) = supplied
        && ctx.relationship(id).is_some_and(|r| r.target == href)
    {
        return Some(id.to_string());
    }
    if let Some(rel) = ctx.find_relationship(relationship_type::HYPERLINK, href) {
        return Some(rel.id.clone());
    }
    ctx.register(Relationship::external(
        supplied.unwrap_or_default(),
        relationship_type::HYPERLINK,
        href,
    ))
}

fn decode_link(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut el = Element::new(ctx.w("hyperlink"));
    let id = resolve_id(node, ctx);
    let mut typed = node.clone();
    typed.attrs.remove("rId");
    typed.content.clear();
    if let Some(id) = id {
        el.set_attr(ctx.r("id"), id);
    }
    write_attrs(&mut el, &typed, LINK_ATTRS, ctx.wml());
    decode_into(&mut el, &node.content, ctx);
    el
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::parse;
    use crate::config::ConvertOptions;
    use crate::ooxml::docx::node::Value;
    use crate::ooxml::opc::constants::relationship_type as rt;
    use crate::ooxml::opc::{Package, PartRecord};

    const RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/></Relationships>"#;

    fn package() -> Package {
        Package::from_records([
            PartRecord::new("word/document.xml", "<w:document><w:body/></w:document>"),
            PartRecord::new("word/_rels/document.xml.rels", RELS),
        ])
    }

    #[test]
    fn test_href_resolved_from_relationship() {
        let package = package();
        let options = ConvertOptions::default();
        let mut ctx = EncodeContext::new(&package, "word/document.xml", &options);
        let el = parse(r#"<w:hyperlink r:id="rId7" w:history="1"><w:r><w:t>site</w:t></w:r></w:hyperlink>"#)
            .unwrap();
        let node = encode_link(&el, &mut ctx).unwrap();
        let link = node.as_known().unwrap();
        assert_eq!(link.str_attr("href"), Some("https://example.com"));
        assert_eq!(link.str_attr("rId"), Some("rId7"));
        assert_eq!(link.str_attr("history"), Some("1"));
    }

    #[test]
    fn test_existing_relationship_is_reused() {
        let package = package();
        let options = ConvertOptions::default();
        let mut ctx = DecodeContext::new(package.relationships("word/document.xml"), &options, Some("w".to_string()));
        let node = Node::new(kind::LINK).with_attr("href", "https://example.com");
        let el = decode_link(&node, &mut ctx);
        assert_eq!(el.attr("r:id"), Some("rId7"));
        assert!(!ctx.into_relationships().1);
    }

    #[test]
    fn test_new_link_registers_relationship() {
        let package = package();
        let options = ConvertOptions::default();
        let mut ctx = DecodeContext::new(package.relationships("word/document.xml"), &options, Some("w".to_string()));
        let node = Node::new(kind::LINK)
            .with_attr("href", "https://new.example")
            .with_attr("anchor", Value::from("top"));
        let el = decode_link(&node, &mut ctx);
        assert_eq!(el.attr("r:id"), Some("rId8"));
        assert_eq!(el.attr("w:anchor"), Some("top"));
        let (rels, changed) = ctx.into_relationships();
        assert!(changed);
        let added = rels.last().unwrap();
        assert_eq!(added.rel_type, rt::HYPERLINK);
        assert!(added.is_external());
    }

    #[test]
    fn test_declared_relationship_prefix_used() {
        let package = package();
        let options = ConvertOptions::default();
        let mut ctx = DecodeContext::new(package.relationships("word/document.xml"), &options, Some("w".to_string()))
            .with_rel_prefix("rel");
        let node = Node::new(kind::LINK).with_attr("href", "https://example.com");
        let el = decode_link(&node, &mut ctx);
        assert_eq!(el.attr("rel:id"), Some("rId7"));
        assert_eq!(el.attr("r:id"), None);
    }
}
