/// Bookmark boundary translators.
///
/// `w:bookmarkStart` carries the bookmark id and name (and, inside tables,
/// the column range); `w:bookmarkEnd` only the id.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{read_attrs, write_attrs};
use crate::ooxml::docx::node::{DocNode, Node, kind};
use crate::ooxml::docx::registry::Translator;

pub const BOOKMARK_START: Translator = Translator {
    encode: encode_start,
    decode: decode_start,
};

pub const BOOKMARK_END: Translator = Translator {
    encode: encode_end,
    decode: decode_end,
};

const START_ATTRS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("colFirst", "colFirst"),
    ("colLast", "colLast"),
];
const END_ATTRS: &[(&str, &str)] = &[("id", "id")];

fn encode_start(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::BOOKMARK_START);
    read_attrs(element, &mut node, START_ATTRS);
    Some(node.into())
}

fn decode_start(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut el = Element::new(ctx.w("bookmarkStart"));
    write_attrs(&mut el, node, START_ATTRS, ctx.wml());
    el
}

fn encode_end(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::BOOKMARK_END);
    read_attrs(element, &mut node, END_ATTRS);
    Some(node.into())
}

fn decode_end(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut el = Element::new(ctx.w("bookmarkEnd"));
    write_attrs(&mut el, node, END_ATTRS, ctx.wml());
    el
}
