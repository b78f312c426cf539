/// Table translators (`w:tbl`, `w:tr`, `w:tc`).
///
/// A table node carries its column widths as `grid`, its overall width, and
/// the borders, cell margins, justification and font it ends up with after
/// style inheritance. Vertically merged cells are folded into a `rowspan` on
/// the first cell; the covered `w:tc` elements are kept on their row as
/// `coveredCells` so they can be written back unchanged.
///
/// Translators for rows and cells find the enclosing table through a
/// [`TableFrame`] stack on the context, so nested tables work naturally.
pub mod grid;
pub mod merge;
pub mod properties;

use crate::common::xml::Element;
use crate::ooxml::docx::context::{DecodeContext, EncodeContext};
use crate::ooxml::docx::format::{
    TBLPR_ORDER, TCPR_ORDER, TRPR_ORDER, XML_ATTRS, apply_extra_attrs, ensure_val_child,
    extra_attrs, format_int, insert_ordered, measure, measure_element, parse_int,
};
use crate::ooxml::docx::node::{DocNode, Node, Value, kind};
use crate::ooxml::docx::registry::{Translator, decode_into, decode_node, encode_children};
use crate::ooxml::docx::styles;
use log::trace;
use merge::{CellPlan, RowspanTracker, VMergeState};
use std::collections::BTreeMap;

pub const TABLE: Translator = Translator {
    encode: encode_table,
    decode: decode_table,
};

pub const ROW: Translator = Translator {
    encode: encode_row,
    decode: decode_row,
};

pub const CELL: Translator = Translator {
    encode: encode_cell,
    decode: decode_cell,
};

const COVERED_CELLS: &str = "coveredCells";

/// Per-table state while its rows are being translated.
#[derive(Debug, Default)]
pub(crate) struct TableFrame {
    columns: Vec<u32>,
    default_width: u32,
    // encode
    plan: Vec<Vec<CellPlan>>,
    row: usize,
    cell: usize,
    covered: Vec<Value>,
    // decode
    col: usize,
    tracker: RowspanTracker,
}

impl TableFrame {
    fn new(columns: Vec<u32>, default_width: u32) -> Self {
        Self {
            columns,
            default_width,
            ..Self::default()
        }
    }

    fn span_width(&self, col: usize, colspan: usize) -> u32 {
        (col..col + colspan)
            .map(|c| self.columns.get(c).copied().unwrap_or(self.default_width))
            .sum()
    }
}

fn int_list(values: impl IntoIterator<Item = u32>) -> Value {
    Value::List(values.into_iter().map(|w| Value::Int(i64::from(w))).collect())
}

fn uint_list(value: Option<&Value>) -> Vec<u32> {
    value
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_int)
        .map(|w| w.clamp(0, i64::from(u32::MAX)) as u32)
        .collect()
}

fn encode_table(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::TABLE);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));

    let tbl_pr = element.child("tblPr");
    let rows: Vec<&Element> = element.children_named("tr").collect();
    let indent = tbl_pr
        .and_then(|p| p.child("tblInd"))
        .and_then(|i| i.attr_local("w"))
        .and_then(parse_int);
    let options = ctx.options();
    let default_width = options.default_column_width;
    let layout = grid::resolve_columns(
        element.child("tblGrid"),
        &rows,
        indent,
        options.width_tolerance,
        default_width,
    );

    let style_id = tbl_pr.and_then(|p| p.child_val("tblStyle"));
    let style = style_id.and_then(|id| {
        let package = ctx.package();
        let styles_part = styles::styles_part(package, ctx.part());
        let found = styles::table_style(package.xml(&styles_part)?, id);
        if found.is_none() {
            trace!("Table style '{}' not found in {}", id, styles_part);
        }
        found
    });
    let inherited = properties::resolve(tbl_pr, style.as_ref());

    node.set_opt("tableStyleId", style_id);
    node.attrs
        .insert("tableWidth".to_string(), grid::table_width(tbl_pr, &layout));
    node.attrs
        .insert("grid".to_string(), int_list(layout.columns.iter().copied()));
    node.set_opt("borders", inherited.borders);
    node.set_opt("cellMargins", inherited.cell_margins);
    node.set_opt("justification", inherited.justification);
    node.set_opt("fontFamily", inherited.font_family);
    if let Some(p) = tbl_pr {
        node.set_opt("tableIndent", p.child("tblInd").and_then(measure));
        node.set_opt("tableLayout", p.child("tblLayout").and_then(|l| l.attr_local("type")));
        node.attrs
            .insert("tableProperties".to_string(), Value::Xml(p.clone()));
    }

    let mut frame = TableFrame::new(layout.columns, default_width);
    frame.plan = merge::plan_rows(&rows);
    ctx.tables.push(frame);
    node.content = encode_children(element, ctx, &["tblPr", "tblGrid"]);
    ctx.tables.pop();
    Some(node.into())
}

fn decode_table(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut tbl = Element::new(ctx.w("tbl"));
    apply_extra_attrs(&mut tbl, node);

    let default_width = ctx.options().default_column_width;
    let mut columns = uint_list(node.attr("grid"));
    if ctx.options().regenerate_table_grids || columns.is_empty() {
        let rows: Vec<&Node> = node
            .content
            .iter()
            .filter_map(DocNode::as_known)
            .filter(|n| n.kind == kind::TABLE_ROW)
            .collect();
        columns = grid::regenerate(&rows, default_width);
        trace!("Regenerated table grid: {:?}", columns);
    }

    tbl.push(table_properties(node, ctx));
    let mut tbl_grid = Element::new(ctx.w("tblGrid"));
    for width in &columns {
        tbl_grid.push(Element::new(ctx.w("gridCol")).with_attr(ctx.w("w"), format_int(i64::from(*width))));
    }
    tbl.push(tbl_grid);

    ctx.tables.push(TableFrame::new(columns, default_width));
    decode_into(&mut tbl, &node.content, ctx);
    ctx.tables.pop();
    tbl
}

/// `w:tblPr` for a table node: the original container with edited typed
/// attributes written over it, or one built from the typed attributes.
fn table_properties(node: &Node, ctx: &DecodeContext) -> Element {
    if let Some(raw) = node.xml_attr("tableProperties") {
        return overlay_table_properties(raw, node, ctx);
    }

    let mut tbl_pr = Element::new(ctx.w("tblPr"));
    ensure_val_child(&mut tbl_pr, "tblStyle", node.str_attr("tableStyleId"), TBLPR_ORDER);
    ensure_val_child(&mut tbl_pr, "jc", node.str_attr("justification"), TBLPR_ORDER);
    let built = [
        node.attr("tableWidth")
            .and_then(|v| measure_element(&ctx.w("tblW"), v)),
        node.attr("tableIndent")
            .and_then(|v| measure_element(&ctx.w("tblInd"), v)),
        node.attr("borders")
            .and_then(|v| properties::borders_element(&ctx.w("tblBorders"), v)),
        node.attr("cellMargins")
            .and_then(|v| properties::margins_element(&ctx.w("tblCellMar"), v)),
        node.str_attr("tableLayout")
            .map(|t| Element::new(ctx.w("tblLayout")).with_attr(ctx.w("type"), t)),
    ];
    for el in built.into_iter().flatten() {
        insert_ordered(&mut tbl_pr, el, TBLPR_ORDER);
    }
    tbl_pr
}

/// Write the typed attributes of `node` over its original `w:tblPr`.
///
/// An attribute is written only when it differs from what the original
/// container and its table style give, so values inherited from the style
/// are not copied into the table.
fn overlay_table_properties(raw: &Element, node: &Node, ctx: &DecodeContext) -> Element {
    let mut tbl_pr = raw.clone();
    ensure_val_child(&mut tbl_pr, "tblStyle", node.str_attr("tableStyleId"), TBLPR_ORDER);
    let style = raw.child_val("tblStyle").and_then(|id| ctx.table_style(id));
    let inherited = properties::resolve(Some(raw), style.as_ref());

    let justification = node.str_attr("justification");
    if justification != inherited.justification.as_deref() {
        ensure_val_child(&mut tbl_pr, "jc", justification, TBLPR_ORDER);
    }

    let width = node.attr("tableWidth");
    let width_unchanged = match grid::declared_width(raw) {
        Some(declared) => width == Some(&declared),
        None => width.is_none_or(|w| grid::is_fallback_width(w, &uint_list(node.attr("grid")))),
    };
    if !width_unchanged {
        replace_property(&mut tbl_pr, "tblW", width.and_then(|v| measure_element(&ctx.w("tblW"), v)));
    }

    let indent = node.attr("tableIndent");
    if indent != raw.child("tblInd").and_then(measure).as_ref() {
        replace_property(&mut tbl_pr, "tblInd", indent.and_then(|v| measure_element(&ctx.w("tblInd"), v)));
    }

    let layout = node.str_attr("tableLayout");
    if layout != raw.child("tblLayout").and_then(|l| l.attr_local("type")) {
        let el = layout.map(|t| Element::new(ctx.w("tblLayout")).with_attr(ctx.w("type"), t));
        replace_property(&mut tbl_pr, "tblLayout", el);
    }

    let borders = node.attr("borders");
    if borders != inherited.borders.as_ref() {
        let el = borders.and_then(|v| properties::borders_element(&ctx.w("tblBorders"), v));
        replace_property(&mut tbl_pr, "tblBorders", el);
    }

    let margins = node.attr("cellMargins");
    if margins != inherited.cell_margins.as_ref() {
        let el = margins.and_then(|v| properties::margins_element(&ctx.w("tblCellMar"), v));
        replace_property(&mut tbl_pr, "tblCellMar", el);
    }
    tbl_pr
}

/// Replace the `local` children of `tbl_pr` with `el`, in schema position.
fn replace_property(tbl_pr: &mut Element, local: &str, el: Option<Element>) {
    tbl_pr.remove_children(local);
    if let Some(el) = el {
        insert_ordered(tbl_pr, el, TBLPR_ORDER);
    }
}

fn encode_row(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let mut node = Node::new(kind::TABLE_ROW);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));
    if let Some(tr_pr) = element.child("trPr") {
        node.set_opt("gridBefore", tr_pr.child_val("gridBefore").and_then(parse_int));
        node.set_opt("gridAfter", tr_pr.child_val("gridAfter").and_then(parse_int));
        node.attrs
            .insert("rowProperties".to_string(), Value::Xml(tr_pr.clone()));
    }
    if let Some(ex) = element.child("tblPrEx") {
        node.attrs
            .insert("rowExceptions".to_string(), Value::Xml(ex.clone()));
    }

    if let Some(frame) = ctx.tables.last_mut() {
        frame.cell = 0;
        frame.covered.clear();
    }
    node.content = encode_children(element, ctx, &["trPr", "tblPrEx"]);
    if let Some(frame) = ctx.tables.last_mut() {
        frame.row += 1;
        if !frame.covered.is_empty() {
            node.attrs
                .insert(COVERED_CELLS.to_string(), Value::List(std::mem::take(&mut frame.covered)));
        }
    }
    Some(node.into())
}

fn decode_row(node: &Node, ctx: &mut DecodeContext) -> Element {
    let mut tr = Element::new(ctx.w("tr"));
    apply_extra_attrs(&mut tr, node);
    if let Some(ex) = node.xml_attr("rowExceptions") {
        tr.push(ex.clone());
    }

    let raw = node.xml_attr("rowProperties");
    let mut tr_pr = raw.cloned().unwrap_or_else(|| Element::new(ctx.w("trPr")));
    let before = node.int_attr("gridBefore");
    let after = node.int_attr("gridAfter").map(format_int);
    ensure_val_child(&mut tr_pr, "gridBefore", before.map(format_int).as_deref(), TRPR_ORDER);
    ensure_val_child(&mut tr_pr, "gridAfter", after.as_deref(), TRPR_ORDER);
    if raw.is_some() || !tr_pr.children.is_empty() {
        tr.push(tr_pr);
    }

    if let Some(frame) = ctx.tables.last_mut() {
        frame.tracker.start_row();
        frame.col = before.map_or(0, |n| n.max(0) as usize);
    }
    for child in &node.content {
        if child.kind() == Some(kind::TABLE_CELL) {
            fill_covered(&mut tr, node, ctx, false);
        }
        for element in decode_node(child, ctx) {
            tr.push(element);
        }
    }
    fill_covered(&mut tr, node, ctx, true);
    tr
}

/// Write `continue` cells for the grid columns a cell above still covers:
/// the one at the cursor, or with `to_end` every one left in the row.
fn fill_covered(tr: &mut Element, row: &Node, ctx: &mut DecodeContext, to_end: bool) {
    loop {
        let Some(frame) = ctx.tables.last_mut() else {
            return;
        };
        let next = if to_end {
            frame.tracker.next_covered(frame.col)
        } else {
            frame.tracker.covered_at(frame.col).map(|span| (frame.col, span))
        };
        let Some((col, span)) = next else {
            return;
        };
        let width = frame.span_width(col, span);
        frame.col = col + span;
        let cell = stored_covered_cell(row, col).unwrap_or_else(|| continuation_cell(ctx, span, width));
        tr.push(cell);
    }
}

/// Original covered `w:tc` recorded for grid column `col`, forced to
/// continue the merge.
fn stored_covered_cell(row: &Node, col: usize) -> Option<Element> {
    let entry = row
        .attr(COVERED_CELLS)?
        .as_list()?
        .iter()
        .filter_map(Value::as_map)
        .find(|m| m.get("col").and_then(Value::as_int) == Some(col as i64))?;
    let mut tc = entry.get("cell")?.as_xml()?.clone();
    let tc_pr = tc.child_mut("tcPr")?;
    if VMergeState::of(tc_pr) != Some(VMergeState::Continue) {
        tc_pr.remove_children("vMerge");
        let name = crate::common::xml::qualified(tc_pr.prefix(), "vMerge");
        insert_ordered(tc_pr, Element::new(name), TCPR_ORDER);
    }
    Some(tc)
}

/// Fresh `continue` cell spanning `span` columns.
fn continuation_cell(ctx: &DecodeContext, span: usize, width: u32) -> Element {
    let mut tc_pr = Element::new(ctx.w("tcPr")).with_child(
        Element::new(ctx.w("tcW"))
            .with_attr(ctx.w("w"), format_int(i64::from(width)))
            .with_attr(ctx.w("type"), "dxa"),
    );
    if span > 1 {
        tc_pr.push(Element::new(ctx.w("gridSpan")).with_attr(ctx.w("val"), format_int(span as i64)));
    }
    tc_pr.push(Element::new(ctx.w("vMerge")));
    Element::new(ctx.w("tc"))
        .with_child(tc_pr)
        .with_child(Element::new(ctx.w("p")))
}

fn encode_cell(element: &Element, ctx: &mut EncodeContext) -> Option<DocNode> {
    let placed = ctx.tables.last_mut().and_then(|frame| {
        let plan = frame.plan.get(frame.row)?.get(frame.cell).copied();
        frame.cell += 1;
        let plan = plan?;
        if plan.rowspan == 0 {
            let mut entry = BTreeMap::new();
            entry.insert("col".to_string(), Value::Int(plan.col as i64));
            entry.insert("cell".to_string(), Value::Xml(element.clone()));
            frame.covered.push(Value::Map(entry));
        }
        let widths: Vec<u32> = (plan.col..plan.col + plan.colspan)
            .map(|c| frame.columns.get(c).copied().unwrap_or(frame.default_width))
            .collect();
        Some((plan, widths))
    });
    if let Some((plan, _)) = &placed
        && plan.rowspan == 0
    {
        trace!("Folding covered cell at column {} into the rowspan above", plan.col);
        return None;
    }

    let mut node = Node::new(kind::TABLE_CELL);
    node.set_opt(XML_ATTRS, extra_attrs(element, &[]));
    match placed {
        Some((plan, widths)) => {
            node.attrs
                .insert("colspan".to_string(), Value::Int(plan.colspan as i64));
            node.attrs
                .insert("rowspan".to_string(), Value::Int(i64::from(plan.rowspan)));
            node.attrs.insert("colwidth".to_string(), int_list(widths));
        },
        None => {
            node.attrs
                .insert("colspan".to_string(), Value::Int(merge::grid_span(element) as i64));
            node.attrs.insert("rowspan".to_string(), Value::Int(1));
        },
    }
    if let Some(tc_pr) = element.child("tcPr") {
        node.set_opt(
            "background",
            tc_pr
                .child("shd")
                .and_then(|s| s.attr_local("fill"))
                .filter(|f| *f != "auto"),
        );
        node.set_opt("verticalAlign", tc_pr.child_val("vAlign"));
        node.attrs
            .insert("cellProperties".to_string(), Value::Xml(tc_pr.clone()));
    }
    node.content = encode_children(element, ctx, &["tcPr"]);
    Some(node.into())
}

fn decode_cell(node: &Node, ctx: &mut DecodeContext) -> Element {
    let colspan = node.int_attr("colspan").map_or(1, |n| n.max(1) as usize);
    let rowspan = node.int_attr("rowspan").map_or(1, |n| n.clamp(1, i64::from(u32::MAX)) as u32);
    let placed_width = ctx.tables.last_mut().map(|frame| {
        let col = frame.col;
        frame.tracker.record(col, colspan, rowspan);
        frame.col += colspan;
        frame.span_width(col, colspan)
    });

    let mut tc = Element::new(ctx.w("tc"));
    apply_extra_attrs(&mut tc, node);

    let raw = node.xml_attr("cellProperties");
    let mut tc_pr = raw.cloned().unwrap_or_else(|| Element::new(ctx.w("tcPr")));
    if raw.is_none() {
        let declared: u32 = uint_list(node.attr("colwidth")).iter().sum();
        let width = if declared > 0 { Some(declared) } else { placed_width };
        if let Some(w) = width {
            let tc_w = Element::new(ctx.w("tcW"))
                .with_attr(ctx.w("w"), format_int(i64::from(w)))
                .with_attr(ctx.w("type"), "dxa");
            insert_ordered(&mut tc_pr, tc_w, TCPR_ORDER);
        }
    }

    if colspan > 1 {
        ensure_val_child(&mut tc_pr, "gridSpan", Some(format_int(colspan as i64).as_str()), TCPR_ORDER);
    } else if tc_pr
        .child_val("gridSpan")
        .and_then(parse_int)
        .is_some_and(|n| n > 1)
    {
        tc_pr.remove_children("gridSpan");
    }

    if rowspan > 1 {
        ensure_val_child(&mut tc_pr, "vMerge", Some("restart"), TCPR_ORDER);
    } else if VMergeState::of(&tc_pr) == Some(VMergeState::Restart) {
        tc_pr.remove_children("vMerge");
    }

    if let Some(fill) = node.str_attr("background") {
        match tc_pr.child_mut("shd") {
            Some(shd) => {
                if shd.attr_local("fill") != Some(fill) {
                    let key = crate::common::xml::qualified(shd.prefix(), "fill");
                    shd.set_attr(key, fill);
                }
            },
            None => {
                let shd = Element::new(ctx.w("shd"))
                    .with_attr(ctx.w("val"), "clear")
                    .with_attr(ctx.w("color"), "auto")
                    .with_attr(ctx.w("fill"), fill);
                insert_ordered(&mut tc_pr, shd, TCPR_ORDER);
            },
        }
    }
    ensure_val_child(&mut tc_pr, "vAlign", node.str_attr("verticalAlign"), TCPR_ORDER);

    if raw.is_some() || !tc_pr.children.is_empty() {
        tc.push(tc_pr);
    }
    decode_into(&mut tc, &node.content, ctx);
    if !tc.elements().any(|e| !e.is("tcPr")) {
        // A cell must end with a block-level element.
        tc.push(Element::new(ctx.w("p")));
    }
    tc
}
