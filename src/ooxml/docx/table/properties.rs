/// Table-level properties resolved against the table style.
use crate::common::xml::{Element, local_name, qualified};
use crate::ooxml::docx::format::{last_child, measure, measure_element};
use crate::ooxml::docx::node::Value;
use crate::ooxml::docx::styles::TableStyle;
use std::collections::BTreeMap;

/// Border/margin sides in schema order.
const SIDES: &[&str] = &["top", "start", "left", "bottom", "end", "right", "insideH", "insideV"];

/// Properties a table may take from its style when not set directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedProps {
    pub borders: Option<Value>,
    pub cell_margins: Option<Value>,
    pub justification: Option<String>,
    pub font_family: Option<String>,
}

/// Containers to consult, lowest precedence first: the style's merged
/// `w:tblPr` children, then the table's own `w:tblPr`.
fn containers<'a>(
    direct: Option<&'a Element>,
    style: Option<&'a TableStyle>,
    local: &'a str,
) -> Vec<&'a Element> {
    let mut found: Vec<&Element> = style
        .map(|s| s.table_properties.children_named(local).collect())
        .unwrap_or_default();
    if let Some(d) = direct {
        found.extend(d.children_named(local));
    }
    found
}

/// Side → attribute map from border containers, later ones overriding.
fn merge_borders(containers: &[&Element]) -> Option<Value> {
    let mut sides = BTreeMap::new();
    for container in containers {
        for side in container.elements() {
            let attrs: BTreeMap<String, Value> = side
                .attributes
                .iter()
                .map(|(k, v)| (local_name(k).to_string(), Value::Str(v.clone())))
                .collect();
            sides.insert(side.local_name().to_string(), Value::Map(attrs));
        }
    }
    (!sides.is_empty()).then_some(Value::Map(sides))
}

/// Side → `{width, type}` map from margin containers, later ones overriding.
fn merge_margins(containers: &[&Element]) -> Option<Value> {
    let mut sides = BTreeMap::new();
    for container in containers {
        for side in container.elements() {
            if let Some(m) = measure(side) {
                sides.insert(side.local_name().to_string(), m);
            }
        }
    }
    (!sides.is_empty()).then_some(Value::Map(sides))
}

/// Resolve borders, cell margins, justification and font of a table.
pub fn resolve(direct: Option<&Element>, style: Option<&TableStyle>) -> InheritedProps {
    let borders = merge_borders(&containers(direct, style, "tblBorders"));
    let cell_margins = merge_margins(&containers(direct, style, "tblCellMar"));
    let justification = direct
        .and_then(|d| d.child_val("jc"))
        .or_else(|| style.and_then(|s| last_child(&s.table_properties, "jc")?.attr_local("val")))
        .map(str::to_string);
    let font_family = style
        .and_then(|s| last_child(&s.run_properties, "rFonts")?.attr_local("ascii"))
        .map(str::to_string);
    InheritedProps {
        borders,
        cell_margins,
        justification,
        font_family,
    }
}

fn ordered_sides(map: &BTreeMap<String, Value>) -> Vec<(&String, &Value)> {
    let rank = |s: &str| SIDES.iter().position(|x| *x == s).unwrap_or(SIDES.len());
    let mut sides: Vec<_> = map.iter().collect();
    sides.sort_by_key(|(k, _)| rank(k));
    sides
}

/// Build a `w:tblBorders`-style container from a `borders` value.
pub fn borders_element(name: &str, value: &Value) -> Option<Element> {
    let map = value.as_map()?;
    let prefix = crate::common::xml::prefix(name);
    let mut container = Element::new(name);
    for (side, attrs) in ordered_sides(map) {
        let mut el = Element::new(qualified(prefix, side));
        for (k, v) in attrs.as_map().into_iter().flatten() {
            if let Some(s) = v.as_str() {
                el.set_attr(qualified(prefix, k), s);
            }
        }
        container.push(el);
    }
    Some(container)
}

/// Build a `w:tblCellMar`-style container from a `cellMargins` value.
pub fn margins_element(name: &str, value: &Value) -> Option<Element> {
    let map = value.as_map()?;
    let prefix = crate::common::xml::prefix(name);
    let mut container = Element::new(name);
    for (side, m) in ordered_sides(map) {
        if let Some(el) = measure_element(&qualified(prefix, side), m) {
            container.push(el);
        }
    }
    Some(container)
}
