//! Shared formatting helpers for WordprocessingML property elements
//! (`w:pPr`, `w:rPr`, `w:tblPr`, `w:trPr`, `w:tcPr`), used in both
//! directions of the conversion.
//!
//! Property containers are kept as their original subtree on the Document
//! Tree; decode starts from that subtree and only touches the children a
//! typed attribute controls, so unknown properties survive unchanged.
use crate::common::xml::{Element, local_name, qualified};
use crate::ooxml::docx::node::{Node, Value};
use std::collections::BTreeMap;

/// Schema order of `w:pPr` children.
pub(crate) const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

/// Schema order of `w:rPr` children.
pub(crate) const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath", "rPrChange",
];

/// Schema order of `w:tblPr` children.
pub(crate) const TBLPR_ORDER: &[&str] = &[
    "tblStyle", "tblpPr", "tblOverlap", "bidiVisual", "tblStyleRowBandSize",
    "tblStyleColBandSize", "tblW", "jc", "tblCellSpacing", "tblInd", "tblBorders", "shd",
    "tblLayout", "tblCellMar", "tblLook", "tblCaption", "tblDescription", "tblPrChange",
];

/// Schema order of `w:trPr` children.
pub(crate) const TRPR_ORDER: &[&str] = &[
    "cnfStyle", "divId", "gridBefore", "gridAfter", "wBefore", "wAfter", "cantSplit", "trHeight",
    "tblHeader", "tblCellSpacing", "jc", "hidden", "ins", "del", "trPrChange",
];

/// Schema order of `w:tcPr` children.
pub(crate) const TCPR_ORDER: &[&str] = &[
    "cnfStyle", "tcW", "gridSpan", "hMerge", "vMerge", "tcBorders", "shd", "noWrap", "tcMar",
    "textDirection", "tcFitText", "vAlign", "hideMark", "headers", "cellIns", "cellDel",
    "cellMerge", "tcPrChange",
];

/// Character formatting carried as `marks` on run nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
}

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Underline, Mark::Strike];

    /// Name used in the `marks` list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strike => "strike",
        }
    }

    /// Local name of the `w:rPr` child that carries this mark.
    pub(crate) fn element(&self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
            Self::Strike => "strike",
        }
    }

    /// Whether `rpr` switches this mark on.
    pub(crate) fn is_set(&self, rpr: &Element) -> bool {
        match rpr.child(self.element()) {
            None => false,
            Some(el) => match el.attr_local("val") {
                None => true,
                Some(v) if *self == Mark::Underline => v != "none",
                Some(v) => is_on(v),
            },
        }
    }
}

/// OOXML boolean attribute value.
#[inline]
pub(crate) fn is_on(val: &str) -> bool {
    !matches!(val, "0" | "false" | "off")
}

/// Parse a decimal integer attribute.
#[inline]
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    atoi_simd::parse::<i64, false, false>(s.trim().as_bytes()).ok()
}

/// Render an integer for an attribute value.
#[inline]
pub(crate) fn format_int(n: i64) -> String {
    itoa::Buffer::new().format(n).to_string()
}

/// Last element child named `local`.
pub(crate) fn last_child<'a>(parent: &'a Element, local: &str) -> Option<&'a Element> {
    parent.elements().filter(|e| e.is(local)).last()
}

/// Key of the `val` attribute of `el`, reusing whatever prefix it already has.
fn val_key(el: &Element) -> String {
    el.attributes
        .iter()
        .find(|(k, _)| local_name(k) == "val")
        .map(|(k, _)| k.clone())
        .unwrap_or_else(|| qualified(el.prefix(), "val"))
}

/// Insert `child` into `parent` at its schema position given by `order`.
pub(crate) fn insert_ordered(parent: &mut Element, child: Element, order: &[&str]) {
    let rank = |local: &str| order.iter().position(|o| *o == local).unwrap_or(usize::MAX);
    let own = rank(child.local_name());
    let pos = parent
        .children
        .iter()
        .position(|c| c.as_element().is_some_and(|e| rank(e.local_name()) > own))
        .unwrap_or(parent.children.len());
    parent.children.insert(pos, child.into());
}

/// Make `parent` carry a `<local w:val="..."/>` child with `val`, or no such
/// child when `val` is `None`. An existing child keeps its other attributes.
pub(crate) fn ensure_val_child(parent: &mut Element, local: &str, val: Option<&str>, order: &[&str]) {
    match val {
        Some(v) => match parent.child_mut(local) {
            Some(existing) => {
                if existing.attr_local("val") != Some(v) {
                    let key = val_key(existing);
                    existing.set_attr(key, v);
                }
            },
            None => {
                let prefix = parent.prefix().map(str::to_string);
                let child = Element::new(qualified(prefix.as_deref(), local))
                    .with_attr(qualified(prefix.as_deref(), "val"), v);
                insert_ordered(parent, child, order);
            },
        },
        None => {
            parent.remove_children(local);
        },
    }
}

/// Switch a mark on or off in `rpr`, leaving it untouched when it already
/// has the requested state.
pub(crate) fn ensure_mark(rpr: &mut Element, mark: Mark, on: bool) {
    if mark.is_set(rpr) == on {
        return;
    }
    rpr.remove_children(mark.element());
    if on {
        let prefix = rpr.prefix().map(str::to_string);
        let mut el = Element::new(qualified(prefix.as_deref(), mark.element()));
        if mark == Mark::Underline {
            el.set_attr(qualified(prefix.as_deref(), "val"), "single");
        }
        insert_ordered(rpr, el, RPR_ORDER);
    }
}

/// Attributes of `el` not listed in `handled` (by local name), as a map
/// keyed by the qualified attribute name.
pub(crate) fn extra_attrs(el: &Element, handled: &[&str]) -> Option<Value> {
    let map: BTreeMap<String, Value> = el
        .attributes
        .iter()
        .filter(|(k, _)| !handled.contains(&local_name(k)))
        .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
        .collect();
    (!map.is_empty()).then_some(Value::Map(map))
}

/// Write back attributes captured by [`extra_attrs`].
pub(crate) fn apply_extra_attrs(el: &mut Element, node: &Node) {
    if let Some(map) = node.attr(XML_ATTRS).and_then(Value::as_map) {
        for (k, v) in map {
            if let Some(s) = v.as_str() {
                el.set_attr(k.as_str(), s);
            }
        }
    }
}

/// Node attribute holding the element attributes no typed attribute covers.
pub(crate) const XML_ATTRS: &str = "xmlAttrs";

/// Copy the attributes listed in `map` (node key, attribute local name) from
/// `element` onto `node` as strings, keeping the rest under [`XML_ATTRS`].
pub(crate) fn read_attrs(element: &Element, node: &mut Node, map: &[(&str, &str)]) {
    for (key, local) in map {
        node.set_opt(key, element.attr_local(local));
    }
    let handled: Vec<&str> = map.iter().map(|(_, local)| *local).collect();
    node.set_opt(XML_ATTRS, extra_attrs(element, &handled));
}

/// Inverse of [`read_attrs`]. Typed attributes are written in the
/// WordprocessingML namespace using `prefix`.
pub(crate) fn write_attrs(element: &mut Element, node: &Node, map: &[(&str, &str)], prefix: Option<&str>) {
    for (key, local) in map {
        if let Some(v) = node.str_attr(key) {
            element.set_attr(qualified(prefix, local), v);
        }
    }
    apply_extra_attrs(element, node);
}

/// `{width, type}` map from an element with `w:w`/`w:type` attributes.
pub(crate) fn measure(el: &Element) -> Option<Value> {
    let width = el.attr_local("w").and_then(parse_int)?;
    let mut map = BTreeMap::new();
    map.insert("width".to_string(), Value::Int(width));
    map.insert(
        "type".to_string(),
        Value::from(el.attr_local("type").unwrap_or("dxa")),
    );
    Some(Value::Map(map))
}

/// Build a `w:w`/`w:type` element from a `{width, type}` map.
pub(crate) fn measure_element(name: &str, value: &Value) -> Option<Element> {
    let map = value.as_map()?;
    let width = map.get("width").and_then(Value::as_int)?;
    let kind = map.get("type").and_then(Value::as_str).unwrap_or("dxa");
    let prefix = crate::common::xml::prefix(name);
    Some(
        Element::new(name)
            .with_attr(qualified(prefix, "w"), format_int(width))
            .with_attr(qualified(prefix, "type"), kind),
    )
}
