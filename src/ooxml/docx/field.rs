/// Field instruction translator (`w:instrText` ↔ `fieldInstruction`).
///
/// The instruction text is kept whole; the parser and serializer keep it as
/// a single run even when the source split it around entities.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{XML_ATTRS, extra_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::paragraph::text_element;
use crate::ooxml::docx::registry::Translator;

pub const FIELD_INSTRUCTION: Translator = Translator {
    encode: encode_instruction,
    decode: decode_instruction,
};

fn encode_instruction(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::FIELD_INSTRUCTION).with_text(element.text());
    node.set_opt(XML_ATTRS, extra_attrs(element, &["space"]));
    Some(node.into())
}

fn decode_instruction(node: &Node, ctx: &mut DecodeContext) -> Element {
    let text = node.text.as_deref().unwrap_or_default();
    text_element(ctx.w("instrText"), text, node)
}
