/// Table grid (column width) reconstruction.
///
/// Widths are in twips (dxa). The explicit `w:tblGrid` is preferred; when it
/// is missing or all zero, widths come from the first row that has cells.
use crate::common::xml::Element;
use crate::ooxml::docx::format::{measure, parse_int};
use crate::ooxml::docx::node::{Node, Value, kind};
use crate::ooxml::docx::table::merge::{grid_before, grid_span};
use log::trace;
use std::collections::BTreeMap;

/// Table width used when nothing declares one: 100% in fiftieths of a percent.
pub const FULL_WIDTH_PCT: i64 = 5000;

/// Column widths of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridLayout {
    pub columns: Vec<u32>,
    /// Whether any width came from the document rather than the fallback
    pub declared: bool,
}

impl GridLayout {
    #[inline]
    pub fn total(&self) -> u64 {
        self.columns.iter().map(|&w| u64::from(w)).sum()
    }

    /// Widths of the `colspan` columns starting at `col`.
    pub fn span_widths(&self, col: usize, colspan: usize, default_width: u32) -> Vec<u32> {
        (col..col + colspan)
            .map(|c| self.columns.get(c).copied().unwrap_or(default_width))
            .collect()
    }
}

/// Widths of the `w:gridCol` children, or `None` when there are none or all
/// are zero.
pub fn declared_grid(tbl_grid: Option<&Element>) -> Option<Vec<u32>> {
    let grid: Vec<u32> = tbl_grid?
        .children_named("gridCol")
        .map(|c| c.attr_local("w").and_then(parse_int).map_or(0, clamp_width))
        .collect();
    if grid.is_empty() || grid.iter().all(|&w| w == 0) {
        None
    } else {
        Some(grid)
    }
}

#[inline]
fn clamp_width(w: i64) -> u32 {
    w.clamp(0, i64::from(u32::MAX)) as u32
}

/// Twips width declared by a cell's `w:tcW`, if it is a positive dxa width.
fn cell_width(tc: &Element) -> Option<u32> {
    let tc_w = tc.child("tcPr")?.child("tcW")?;
    match tc_w.attr_local("type") {
        None | Some("dxa") => {},
        Some(_) => return None,
    }
    tc_w.attr_local("w")
        .and_then(parse_int)
        .filter(|&w| w > 0)
        .map(clamp_width)
}

/// Sum of the dxa widths declared by a row's cells.
fn row_width(tr: &Element) -> i64 {
    tr.children_named("tc")
        .filter_map(cell_width)
        .map(i64::from)
        .sum()
}

/// Column widths implied by one row: each cell's width split evenly across
/// the columns it spans (any remainder going to the last one). Columns the
/// row does not size keep `base`, or `default_width` beyond it.
fn widths_from_row(tr: &Element, base: &[u32], default_width: u32) -> GridLayout {
    let mut columns = base.to_vec();
    let mut declared = !base.is_empty();
    let mut col = grid_before(tr);
    let fill = |columns: &mut Vec<u32>, upto: usize| {
        while columns.len() < upto {
            columns.push(default_width);
        }
    };

    fill(&mut columns, col);
    for tc in tr.children_named("tc") {
        let span = grid_span(tc);
        fill(&mut columns, col + span);
        if let Some(width) = cell_width(tc) {
            declared = true;
            let share = width / span as u32;
            for (i, slot) in columns[col..col + span].iter_mut().enumerate() {
                *slot = if i + 1 == span {
                    width - share * (span as u32 - 1)
                } else {
                    share
                };
            }
        } else {
            for slot in &mut columns[col..col + span] {
                if *slot == 0 {
                    *slot = default_width;
                }
            }
        }
        col += span;
    }
    GridLayout { columns, declared }
}

/// Resolve a table's column widths.
///
/// When the grid and the first row disagree, the grid is still trusted if a
/// table indent accounts for the difference: same sign, and magnitudes
/// within `tolerance` twips of each other. Otherwise the widths are
/// recomputed from the row's cells.
pub fn resolve_columns(
    tbl_grid: Option<&Element>,
    rows: &[&Element],
    indent: Option<i64>,
    tolerance: u32,
    default_width: u32,
) -> GridLayout {
    let first = rows.iter().find(|tr| tr.child("tc").is_some());

    let Some(grid) = declared_grid(tbl_grid) else {
        trace!("No usable tblGrid, deriving columns from first row");
        return first
            .map(|tr| widths_from_row(tr, &[], default_width))
            .unwrap_or_default();
    };
    let Some(first) = first else {
        return GridLayout {
            columns: grid,
            declared: true,
        };
    };

    let row_sum = row_width(first);
    let grid_sum: i64 = grid.iter().map(|&w| i64::from(w)).sum();
    let discrepancy = grid_sum - row_sum;
    if row_sum == 0 || discrepancy == 0 {
        return GridLayout {
            columns: grid,
            declared: true,
        };
    }

    if let Some(indent) = indent.filter(|&i| i != 0)
        && discrepancy.signum() == indent.signum()
        && (discrepancy.abs() - indent.abs()).abs() <= i64::from(tolerance)
    {
        trace!(
            "Grid/row width discrepancy {} explained by indent {}, keeping grid",
            discrepancy, indent
        );
        return GridLayout {
            columns: grid,
            declared: true,
        };
    }

    trace!("Grid/row width discrepancy {}, recomputing columns from cells", discrepancy);
    widths_from_row(first, &grid, default_width)
}

/// `tableWidth` value: the declared `w:tblW` when usable, else the grid
/// total, else the full-width sentinel.
pub fn table_width(tbl_pr: Option<&Element>, layout: &GridLayout) -> Value {
    if let Some(value) = tbl_pr.and_then(declared_width) {
        return value;
    }
    if layout.declared && layout.total() > 0 {
        width_value(layout.total() as i64, "dxa")
    } else {
        width_value(FULL_WIDTH_PCT, "pct")
    }
}

/// The `w:tblW` of `tbl_pr` when it is a positive dxa or pct width.
pub fn declared_width(tbl_pr: &Element) -> Option<Value> {
    let value = tbl_pr.child("tblW").and_then(measure)?;
    let map = value.as_map()?;
    let usable = map.get("width").and_then(Value::as_int).is_some_and(|w| w > 0)
        && matches!(map.get("type").and_then(Value::as_str), Some("dxa" | "pct"));
    usable.then_some(value)
}

/// Whether `value` is one of the widths [`table_width`] falls back to for a
/// table with these columns.
pub fn is_fallback_width(value: &Value, columns: &[u32]) -> bool {
    let total: u64 = columns.iter().map(|&w| u64::from(w)).sum();
    *value == width_value(FULL_WIDTH_PCT, "pct") || (total > 0 && *value == width_value(total as i64, "dxa"))
}

fn width_value(width: i64, unit: &str) -> Value {
    let mut map = BTreeMap::new();
    map.insert("width".to_string(), Value::Int(width));
    map.insert("type".to_string(), Value::from(unit));
    Value::Map(map)
}

/// Rebuild column widths from the Document Tree rows: the first row with
/// cells, using each cell's `colwidth` list.
pub fn regenerate(rows: &[&Node], default_width: u32) -> Vec<u32> {
    let Some(row) = rows
        .iter()
        .find(|r| r.content.iter().any(|c| c.kind() == Some(kind::TABLE_CELL)))
    else {
        return Vec::new();
    };
    let before = row.int_attr("gridBefore").map_or(0, |n| n.max(0) as usize);
    let mut columns = vec![default_width; before];
    for cell in row.content.iter().filter_map(|c| c.as_known()) {
        if cell.kind != kind::TABLE_CELL {
            continue;
        }
        let colspan = cell.int_attr("colspan").map_or(1, |n| n.max(1) as usize);
        let widths = cell.attr("colwidth").and_then(Value::as_list).unwrap_or_default();
        for i in 0..colspan {
            let w = widths
                .get(i)
                .and_then(Value::as_int)
                .filter(|&w| w > 0)
                .map_or(default_width, clamp_width);
            columns.push(w);
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::parse;

    fn table(xml: &str) -> Element {
        parse(xml).unwrap()
    }

    fn resolve(tbl: &Element, indent: Option<i64>) -> GridLayout {
        let rows: Vec<&Element> = tbl.children_named("tr").collect();
        resolve_columns(tbl.child("tblGrid"), &rows, indent, 5, 1440)
    }

    #[test]
    fn test_grid_preferred() {
        let tbl = table(r#"<w:tbl><w:tblGrid><w:gridCol w:w="2000"/><w:gridCol w:w="3000"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:tcW w:w="2000" w:type="dxa"/></w:tcPr></w:tc><w:tc><w:tcPr><w:tcW w:w="3000" w:type="dxa"/></w:tcPr></w:tc></w:tr></w:tbl>"#);
        assert_eq!(resolve(&tbl, None).columns, [2000, 3000]);
    }

    #[test]
    fn test_fallback_from_first_content_row() {
        let tbl = table(r#"<w:tbl><w:tblGrid><w:gridCol w:w="0"/></w:tblGrid><w:tr/><w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/><w:tcW w:w="3001"/></w:tcPr></w:tc><w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/></w:tcPr></w:tc></w:tr></w:tbl>"#);
        let layout = resolve(&tbl, None);
        assert_eq!(layout.columns, [1500, 1501, 1440]);
        assert!(layout.declared);
    }

    #[test]
    fn test_indent_within_tolerance_keeps_grid() {
        // grid 5100, cells 5000: +100 explained by a 103 twip indent
        let tbl = table(r#"<w:tbl><w:tblGrid><w:gridCol w:w="2600"/><w:gridCol w:w="2500"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:tcW w:w="2500"/></w:tcPr></w:tc><w:tc><w:tcPr><w:tcW w:w="2500"/></w:tcPr></w:tc></w:tr></w:tbl>"#);
        assert_eq!(resolve(&tbl, Some(103)).columns, [2600, 2500]);
        // Outside tolerance, or opposite sign: recomputed from the cells
        assert_eq!(resolve(&tbl, Some(110)).columns, [2500, 2500]);
        assert_eq!(resolve(&tbl, Some(-100)).columns, [2500, 2500]);
        assert_eq!(resolve(&tbl, None).columns, [2500, 2500]);
    }

    #[test]
    fn test_table_width_sources() {
        let declared = GridLayout {
            columns: vec![1000, 2000],
            declared: true,
        };
        let tbl_pr = parse(r#"<w:tblPr><w:tblW w:w="4000" w:type="dxa"/></w:tblPr>"#).unwrap();
        let width = table_width(Some(&tbl_pr), &declared);
        assert_eq!(width.as_map().unwrap()["width"], Value::Int(4000));

        let auto = parse(r#"<w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#).unwrap();
        let width = table_width(Some(&auto), &declared);
        assert_eq!(width.as_map().unwrap()["width"], Value::Int(3000));

        let width = table_width(None, &GridLayout::default());
        let map = width.as_map().unwrap();
        assert_eq!(map["width"], Value::Int(FULL_WIDTH_PCT));
        assert_eq!(map["type"], Value::from("pct"));
    }

    #[test]
    fn test_regenerate_from_cells() {
        let cell = |span: i64, widths: Vec<i64>| {
            crate::ooxml::docx::node::DocNode::Known(
                Node::new(kind::TABLE_CELL)
                    .with_attr("colspan", span)
                    .with_attr("colwidth", Value::List(widths.into_iter().map(Value::Int).collect())),
            )
        };
        let row = Node::new(kind::TABLE_ROW)
            .with_attr("gridBefore", 1i64)
            .with_child(cell(2, vec![100, 200]))
            .with_child(cell(1, vec![]));
        assert_eq!(regenerate(&[&row], 1440), [1440, 100, 200, 1440]);
    }
}
