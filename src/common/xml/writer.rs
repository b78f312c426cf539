//! [`Element`] tree → XML text.
use super::element::{Element, XmlNode};
use super::escape::escape_xml;
use super::whitespace;

/// Declaration written before the root of every serialized part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize a part: declaration, newline, then the root element.
pub fn serialize_document(root: &Element) -> String {
    let mut out = String::with_capacity(XML_DECLARATION.len() + 1024);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_element(root, &mut out);
    out
}

/// Serialize an element subtree without a declaration.
///
/// Elements without children are written self-closing. Text is escaped for
/// the five reserved characters, with two exceptions:
/// - `w:instrText` concatenates all of its text children into one run
///   before escaping, so field instructions split by the parser are
///   written back as a single instruction;
/// - `w:t` and `w:delText` remove the whitespace placeholder before
///   escaping, restoring the original whitespace.
pub fn serialize(element: &Element) -> String {
    let mut out = String::with_capacity(256);
    write_element(element, &mut out);
    out
}

#[derive(Clone, Copy)]
enum TextMode {
    Plain,
    Concatenate,
    StripPlaceholder,
}

fn text_mode(element: &Element) -> TextMode {
    if element.is("instrText") {
        TextMode::Concatenate
    } else if element.is("t") || element.is("delText") {
        TextMode::StripPlaceholder
    } else {
        TextMode::Plain
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    match text_mode(element) {
        TextMode::Concatenate => {
            let mut joined = String::new();
            for child in &element.children {
                if let XmlNode::Text { text } = child {
                    joined.push_str(text);
                }
            }
            out.push_str(&escape_xml(&joined));
            for child in element.elements() {
                write_element(child, out);
            }
        },
        mode => {
            for child in &element.children {
                match child {
                    XmlNode::Element(e) => write_element(e, out),
                    XmlNode::Text { text } => match mode {
                        TextMode::StripPlaceholder => {
                            out.push_str(&escape_xml(&whitespace::strip(text)))
                        },
                        _ => out.push_str(&escape_xml(text)),
                    },
                }
            }
        },
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
