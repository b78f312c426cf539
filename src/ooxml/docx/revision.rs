/// Tracked change translators (`w:ins` ↔ `trackInsert`, `w:del` ↔
/// `trackDelete`).
///
/// Only run-level revisions are represented here; property-change records
/// (`w:rPrChange`, `w:pPrChange`) stay inside the property subtrees.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{read_attrs, write_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::{Translator, decode_into, encode_children};

pub const TRACK_INSERT: Translator = Translator {
    encode: encode_insert,
    decode: decode_insert,
};

pub const TRACK_DELETE: Translator = Translator {
    encode: encode_delete,
    decode: decode_delete,
};

const REVISION_ATTRS: &[(&str, &str)] = &[("id", "id"), ("author", "author"), ("date", "date")];

fn encode_revision(element: &Element, ctx: &mut EncodeContext, kind: &str) -> Option<DocNode> {
    let mut node = Node::new(kind);
    read_attrs(element, &mut node, REVISION_ATTRS);
    node.content = encode_children(element, ctx, &[]);
    Some(node.into())
}

fn decode_revision(node: &Node, ctx: &mut DecodeContext, local: &str) -> Element {
    let mut el = Element::new(ctx.w(local));
    write_attrs(&mut el, node, REVISION_ATTRS, ctx.wml());
    decode_into(&mut el, &node.content, ctx);
    el
}

fn encode_insert(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    encode_revision(element, ctx, kind::TRACK_INSERT)
}

fn decode_insert(node: &Node, ctx: &mut DecodeContext) -> Element {
    decode_revision(node, ctx, "ins")
}

fn encode_delete(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    encode_revision(element, ctx, kind::TRACK_DELETE)
}

fn decode_delete(node: &Node, ctx: &mut DecodeContext) -> Element {
    decode_revision(node, ctx, "del")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::{parse, serialize};
    use crate::config::ConvertOptions;
    use crate::ooxml::docx::registry::{decode_node, encode_element};
    use crate::ooxml::opc::Package;

    #[test]
    fn test_deletion_round_trip() {
        let xml = r#"<w:del w:id="3" w:author="Ann" w:date="2024-01-02T03:04:00Z"><w:r><w:delText>old</w:delText></w:r></w:del>"#;
        let package = Package::new();
        let options = ConvertOptions::default();
        let mut ectx = EncodeContext::new(&package, "word/document.xml", &options);
        let node = encode_element(&parse(xml).unwrap(), &mut ectx).unwrap();
        let known = node.as_known().unwrap();
        assert_eq!(known.kind, kind::TRACK_DELETE);
        assert_eq!(known.str_attr("author"), Some("Ann"));
        assert_eq!(node.plain_text(), "old");

        let mut dctx = DecodeContext::new(Vec::new(), &options, Some("w".to_string()));
        assert_eq!(serialize(&decode_node(&node, &mut dctx)[0]), xml);
    }
}
