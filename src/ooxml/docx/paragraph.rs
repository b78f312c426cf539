/// Paragraph, run and run-content translators.
///
/// `w:p` becomes a `paragraph`, `w:r` a `run`, and the run content elements
/// (`w:t`, `w:delText`, `w:tab`, `w:br`) become leaf nodes. The original
/// property containers travel with the node as `paragraphProperties` /
/// `runProperties`, and the typed attributes are overlaid onto them on the
/// way back.
use crate::common::xml::{Element, whitespace};
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{
    Mark, PPR_ORDER, RPR_ORDER, XML_ATTRS, apply_extra_attrs, ensure_mark, ensure_val_child,
    extra_attrs, format_int, insert_ordered, parse_int,
};
use crate::ooxml::docx::node::{DocNode, Node, Value, kind};
use crate::ooxml::docx::registry::{Translator, decode_into, encode_children};

pub const PARAGRAPH: Translator = Translator {
    encode: encode_paragraph,
    decode: decode_paragraph,
};

pub const RUN: Translator = Translator {
    encode: encode_run,
    decode: decode_run,
};

pub const TEXT: Translator = Translator {
    encode: encode_text,
    decode: decode_text,
};

pub const TAB: Translator = Translator {
    encode: encode_tab,
    decode: decode_tab,
};

pub const LINE_BREAK: Translator = Translator {
    encode: encode_break,
    decode: decode_break,
};

const W14_PARA_ID: &str = "w14:paraId";
const W14_TEXT_ID: &str = "w14:textId";
const XML_SPACE: &str = "xml:space";

fn encode_paragraph(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::PARAGRAPH);
    node.set_opt("paraId", element.attr_local("paraId"));
    node.set_opt("textId", element.attr_local("textId"));
    node.set_opt(XML_ATTRS, extra_attrs(element, &["paraId", "textId"]));
    if let Some(ppr) = element.child("pPr") {
        node.set_opt("styleId", ppr.child_val("pStyle"));
        node.set_opt("justification", ppr.child_val("jc"));
        node.attrs
            .insert("paragraphProperties".to_string(), Value::Xml(ppr.clone()));
    }
    node.content = encode_children(element, ctx, &["pPr"]);
    Some(node.into())
}

fn decode_paragraph(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut p = Element::new(ctx.w("p"));
    if let Some(id) = node.str_attr("paraId") {
        p.set_attr(W14_PARA_ID, id);
    }
    if let Some(id) = node.str_attr("textId") {
        p.set_attr(W14_TEXT_ID, id);
    }
    apply_extra_attrs(&mut p, node);

    let raw = node.xml_attr("paragraphProperties");
    let mut ppr = raw.cloned().unwrap_or_else(|| Element::new(ctx.w("pPr")));
    ensure_val_child(&mut ppr, "pStyle", node.str_attr("styleId"), PPR_ORDER);
    ensure_val_child(&mut ppr, "jc", node.str_attr("justification"), PPR_ORDER);
    if raw.is_some() || !ppr.children.is_empty() {
        p.push(ppr);
    }

    decode_into(&mut p, &node.content, ctx);
    p
}

fn encode_run(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::RUN);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));
    if let Some(rpr) = element.child("rPr") {
        let marks: Vec<Value> = Mark::ALL
            .iter()
            .filter(|m| m.is_set(rpr))
            .map(|m| Value::from(m.as_str()))
            .collect();
        if !marks.is_empty() {
            node.attrs.insert("marks".to_string(), Value::List(marks));
        }
        node.set_opt("color", rpr.child_val("color"));
        node.set_opt("fontSize", rpr.child_val("sz").and_then(parse_int));
        node.set_opt(
            "fontFamily",
            rpr.child("rFonts").and_then(|f| f.attr_local("ascii")),
        );
        node.attrs
            .insert("runProperties".to_string(), Value::Xml(rpr.clone()));
    }
    node.content = encode_children(element, ctx, &["rPr"]);
    Some(node.into())
}

fn decode_run(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut r = Element::new(ctx.w("r"));
    apply_extra_attrs(&mut r, node);

    let raw = node.xml_attr("runProperties");
    let mut rpr = raw.cloned().unwrap_or_else(|| Element::new(ctx.w("rPr")));
    let marks: Vec<&str> = node
        .attr("marks")
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    for mark in Mark::ALL {
        ensure_mark(&mut rpr, mark, marks.contains(&mark.as_str()));
    }
    ensure_val_child(&mut rpr, "color", node.str_attr("color"), RPR_ORDER);
    let size = node.int_attr("fontSize").map(format_int);
    ensure_val_child(&mut rpr, "sz", size.as_deref(), RPR_ORDER);
    ensure_font(&mut rpr, node.str_attr("fontFamily"));
    if raw.is_some() || !rpr.children.is_empty() {
        r.push(rpr);
    }

    decode_into(&mut r, &node.content, ctx);
    r
}

/// Make `w:rFonts/@w:ascii` match `family`. A new font also sets `w:hAnsi`.
fn ensure_font(rpr: &mut Element, family: Option<&str>) {
    let current = rpr
        .child("rFonts")
        .and_then(|f| f.attr_local("ascii"))
        .map(str::to_string);
    if current.as_deref() == family {
        return;
    }
    let prefix = rpr.prefix().map(str::to_string);
    let key = |local: &str| crate::common::xml::qualified(prefix.as_deref(), local);
    match (family, rpr.child_mut("rFonts")) {
        (Some(f), Some(fonts)) => {
            fonts.set_attr(key("ascii"), f);
            fonts.set_attr(key("hAnsi"), f);
        },
        (Some(f), None) => {
            let fonts = Element::new(key("rFonts"))
                .with_attr(key("ascii"), f)
                .with_attr(key("hAnsi"), f);
            insert_ordered(rpr, fonts, RPR_ORDER);
        },
        (None, Some(fonts)) => {
            fonts.remove_attr(&key("ascii"));
            fonts.remove_attr(&key("hAnsi"));
            if fonts.attributes.is_empty() {
                rpr.remove_children("rFonts");
            }
        },
        (None, None) => {},
    }
}

fn encode_text(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::TEXT).with_text(whitespace::strip(&element.text()));
    if element.is("delText") {
        node.attrs.insert("deleted".to_string(), Value::Bool(true));
    }
    node.set_opt(XML_ATTRS, extra_attrs(element, &["space"]));
    Some(node.into())
}

fn decode_text(node: &Node, ctx: &mut DecodeContext) -> Element {
    let name = if node.bool_attr("deleted") {
        "delText"
    } else {
        "t"
    };
    let text = node.text.as_deref().unwrap_or_default();
    text_element(ctx.w(name), text, node)
}

/// Build a text-bearing element, marking it space-preserving when the text
/// has leading or trailing whitespace.
pub(crate) fn text_element(name: String, text: &str, node: &Node) -> Element {
    let mut element = Element::new(name);
    if needs_preserve(text) {
        element.set_attr(XML_SPACE, "preserve");
    }
    apply_extra_attrs(&mut element, node);
    if !text.is_empty() {
        element.push(crate::common::xml::XmlNode::text(whitespace::protect(text)));
    }
    element
}

#[inline]
fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

fn encode_tab(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::TAB);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));
    Some(node.into())
}

fn decode_tab(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut tab = Element::new(ctx.w("tab"));
    apply_extra_attrs(&mut tab, node);
    tab
}

fn encode_break(element: &Element, _ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::LINE_BREAK);
    node.set_opt("breakType", element.attr_local("type"));
    node.set_opt("clear", element.attr_local("clear"));
    node.set_opt(XML_ATTRS, extra_attrs(element, &["type", "clear"]));
    Some(node.into())
}

fn decode_break(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut br = Element::new(ctx.w("br"));
    if let Some(t) = node.str_attr("breakType") {
        br.set_attr(ctx.w("type"), t);
    }
    if let Some(c) = node.str_attr("clear") {
        br.set_attr(ctx.w("clear"), c);
    }
    apply_extra_attrs(&mut br, node);
    br
}
