/// Inline image translator (`w:drawing` ↔ `image`).
///
/// The drawing subtree is kept whole as the `drawing` attribute; the node
/// exposes the picture's relationship id, its target (`src`) and the
/// extent in EMUs. Width and height written back onto a kept subtree update
/// both the frame extent and the picture transform. A node without a
/// `drawing` subtree (an image inserted by the editor) gets a minimal inline
/// picture.
use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{format_int, parse_int};
use crate::ooxml::docx::node::{DocNode, Node, Value, kind};
use crate::ooxml::docx::registry::Translator;
use crate::ooxml::opc::Relationship;
use crate::ooxml::opc::constants::{namespace, relationship_type};

pub const IMAGE: Translator = Translator {
    encode: encode_drawing,
    decode: decode_drawing,
};

/// One inch in EMUs; size of an image inserted without an extent.
const DEFAULT_EXTENT: i64 = 914_400;

const PICTURE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

fn encode_drawing(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::IMAGE);
    let id = element
        .find_descendant("blip")
        .and_then(|b| b.attr_local("embed"))
        .map(str::to_string);
    if let Some(id) = &id {
        node.set_opt("src", ctx.relationship(id).map(|r| r.target.clone()));
    }
    node.set_opt("rId", id);
    if let Some(extent) = element.find_descendant("extent") {
        node.set_opt("width", extent.attr("cx").and_then(parse_int));
        node.set_opt("height", extent.attr("cy").and_then(parse_int));
    }
    node.attrs
        .insert("drawing".to_string(), Value::Xml(element.clone()));
    Some(node.into())
}

fn resolve_id(node: &Node, ctx: &mut DecodeContext) -> Option<String> {
    let supplied = node.str_attr("rId");
    let Some(src) = node.str_attr("src") else {
        return supplied.map(str::to_string);
    };
    if let Some(id) = supplied
        && ctx.relationship(id).is_some_and(|r| r.target == src)
    {
        return Some(id.to_string());
    }
    if let Some(rel) = ctx.find_relationship(relationship_type::IMAGE, src) {
        return Some(rel.id.clone());
    }
    ctx.register(Relationship::new(
        supplied.unwrap_or_default(),
        relationship_type::IMAGE,
        src,
    ))
}

fn decode_drawing(node: &Node, ctx: &mut DecodeContext) -> Element {
    let id = resolve_id(node, ctx);
    let mut drawing = match node.xml_attr("drawing") {
        Some(raw) => {
            let mut drawing = raw.clone();
            resize(&mut drawing, node.int_attr("width"), node.int_attr("height"));
            drawing
        },
        None => minimal_drawing(
            ctx,
            node.int_attr("width").unwrap_or(DEFAULT_EXTENT),
            node.int_attr("height").unwrap_or(DEFAULT_EXTENT),
        ),
    };
    if let Some(id) = id
        && let Some(blip) = drawing.find_descendant_mut("blip")
    {
        let key = blip
            .attributes
            .iter()
            .find(|(k, _)| crate::common::xml::local_name(k) == "embed")
            .map(|(k, _)| k.clone())
            .unwrap_or_else(|| ctx.r("embed"));
        blip.set_attr(key, id);
    }
    drawing
}

/// Write `cx`/`cy` onto `wp:extent` and the `a:xfrm` extent of the picture.
fn resize(drawing: &mut Element, cx: Option<i64>, cy: Option<i64>) {
    let set = |el: &mut Element| {
        if let Some(cx) = cx {
            el.set_attr("cx", format_int(cx));
        }
        if let Some(cy) = cy {
            el.set_attr("cy", format_int(cy));
        }
    };
    if let Some(extent) = drawing.find_descendant_mut("extent") {
        set(extent);
    }
    if let Some(ext) = drawing
        .find_descendant_mut("xfrm")
        .and_then(|xfrm| xfrm.child_mut("ext"))
    {
        set(ext);
    }
}

fn minimal_drawing(ctx: &DecodeContext, cx: i64, cy: i64) -> Element {
    let cx = format_int(cx);
    let cy = format_int(cy);
    let picture = Element::new("pic:pic")
        .with_attr("xmlns:pic", namespace::PIC)
        .with_child(
            Element::new("pic:nvPicPr")
                .with_child(Element::new("pic:cNvPr").with_attr("id", "0").with_attr("name", "image"))
                .with_child(Element::new("pic:cNvPicPr")),
        )
        .with_child(
            Element::new("pic:blipFill")
                .with_child(Element::new("a:blip"))
                .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
        )
        .with_child(
            Element::new("pic:spPr")
                .with_child(
                    Element::new("a:xfrm")
                        .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                        .with_child(
                            Element::new("a:ext")
                                .with_attr("cx", cx.as_str())
                                .with_attr("cy", cy.as_str()),
                        ),
                )
                .with_child(
                    Element::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(Element::new("a:avLst")),
                ),
        );
    let inline = Element::new("wp:inline")
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(
            Element::new("wp:extent")
                .with_attr("cx", cx.as_str())
                .with_attr("cy", cy.as_str()),
        )
        .with_child(Element::new("wp:docPr").with_attr("id", "1").with_attr("name", "Picture 1"))
        .with_child(
            Element::new("a:graphic").with_attr("xmlns:a", namespace::A).with_child(
                Element::new("a:graphicData")
                    .with_attr("uri", PICTURE_URI)
                    .with_child(picture),
            ),
        );
    Element::new(ctx.w("drawing")).with_child(inline)
}
