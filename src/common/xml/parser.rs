//! XML text → [`Element`] tree.
use super::element::{Element, XmlNode};
use super::escape::{decode_entities, resolve_entity};
use super::name::matches_local;
use super::whitespace::{is_whitespace_only, protect};
use crate::common::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parse one part's XML text into its root element.
///
/// The XML declaration, comments, processing instructions and doctype are
/// not retained. Whitespace-only text inside `w:t` and `w:delText` is
/// wrapped in the whitespace placeholder. Elsewhere it is kept when it is an
/// element's only content and dropped when it sits next to child elements.
/// `w:instrText` keeps it in either case.
///
/// # Errors
///
/// Returns [`Error::MalformedXml`] (with an empty part name) when the text is
/// not well-formed: mismatched or unclosed tags, duplicate attributes,
/// missing or multiple root elements, or stray text outside the root.
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::with_capacity(16);
    let mut root: Option<Element> = None;
    let mut pending = String::new();

    loop {
        let event = reader.read_event().map_err(|e| malformed(format!(
            "{} at byte {}",
            e,
            reader.buffer_position()
        )))?;
        match event {
            Event::Start(e) => {
                flush_text(&mut stack, &mut pending, true)?;
                stack.push(open_element(&e)?);
            },
            Event::Empty(e) => {
                flush_text(&mut stack, &mut pending, true)?;
                let element = open_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::End(_) => {
                flush_text(&mut stack, &mut pending, false)?;
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            },
            Event::Text(e) => {
                let raw = std::str::from_utf8(e.as_ref())?;
                pending.push_str(&decode_entities(raw));
            },
            Event::GeneralRef(e) => {
                let name = std::str::from_utf8(e.as_ref())?;
                pending.push_str(&resolve_entity(name));
            },
            Event::CData(e) => {
                pending.push_str(std::str::from_utf8(e.as_ref())?);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    if !pending.trim().is_empty() {
        return Err(malformed("text after root element".to_string()));
    }
    root.ok_or_else(|| malformed("no root element".to_string()))
}

fn malformed(message: String) -> Error {
    Error::MalformedXml {
        part: String::new(),
        message,
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        element
            .attributes
            .push((key.to_string(), decode_entities(value).into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_some() => return Err(malformed("multiple root elements".to_string())),
        None => *root = Some(element),
    }
    Ok(())
}

/// Attach pending text to the open element. `before_element` is set when
/// the text is followed by a child element.
fn flush_text(stack: &mut [Element], pending: &mut String, before_element: bool) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    let text = std::mem::take(pending);
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(malformed("text outside root element".to_string()));
    };
    if !is_whitespace_only(&text) {
        parent.children.push(XmlNode::text(text));
    } else if parent.is("t") || parent.is("delText") {
        parent.children.push(XmlNode::text(protect(&text).into_owned()));
    } else if matches_local(&parent.name, "instrText")
        || (!before_element && parent.elements().next().is_none())
    {
        parent.children.push(XmlNode::text(text));
    }
    Ok(())
}
