/// Document body translator (`w:body` ↔ `doc`).
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{XML_ATTRS, apply_extra_attrs, extra_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::{Translator, decode_into, encode_children};

pub const BODY: Translator = Translator {
    encode: encode_body,
    decode: decode_body,
};

fn encode_body(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::DOC);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));
    node.content = encode_children(element, ctx, &[]);
    Some(node.into())
}

fn decode_body(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut body = Element::new(ctx.w("body"));
    apply_extra_attrs(&mut body, node);
    decode_into(&mut body, &node.content, ctx);
    body
}

/// Replace the `w:body` of a `w:document` root with `body`, keeping the
/// root's name, namespace declarations and any sibling elements.
pub(crate) fn replace_body(document: &Element, body: Element) -> Element {
    let mut root = Element::new(document.name.as_str());
    root.attributes = document.attributes.clone();
    let mut placed = false;
    for child in &document.children {
        match child.as_element() {
            Some(e) if e.is("body") => {
                if !placed {
                    root.push(body.clone());
                    placed = true;
                }
            },
            _ => root.children.push(child.clone()),
        }
    }
    if !placed {
        root.push(body);
    }
    root
}
