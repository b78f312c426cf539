/// Vertically merged cells.
///
/// WordprocessingML spells a vertical merge as one `restart` cell followed
/// by `continue` cells in the same grid column of the rows below. The
/// Document Tree instead gives the first cell a `rowspan` and leaves the
/// covered cells out. [`plan_rows`] maps the first form to the second;
/// [`RowspanTracker`] drives the way back.
use crate::common::xml::Element;
use crate::ooxml::docx::format::parse_int;
use log::trace;

/// Vertical merge state for table cells.
///
/// In OOXML, vertical merging uses the `<w:vMerge>` element:
/// - `restart`: Starts a new vertical merge (first cell in the merge)
/// - `continue`: Continues a vertical merge from the cell above (no `val` attribute or `val="continue"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMergeState {
    /// Starts a vertical merge (`<w:vMerge w:val="restart"/>`)
    Restart,
    /// Continues a vertical merge from above (`<w:vMerge/>` or `<w:vMerge w:val="continue"/>`)
    Continue,
}

impl VMergeState {
    /// Merge state declared by a `w:tcPr`, if any.
    pub fn of(tc_pr: &Element) -> Option<Self> {
        let v_merge = tc_pr.child("vMerge")?;
        match v_merge.attr_local("val") {
            Some("restart") => Some(Self::Restart),
            _ => Some(Self::Continue),
        }
    }
}

/// Position of one `w:tc` in the table grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlan {
    /// First grid column
    pub col: usize,
    /// `w:gridSpan`
    pub colspan: usize,
    /// Rows covered; 0 for a cell swallowed by a merge from above
    pub rowspan: u32,
}

/// `w:gridBefore` of a row.
pub(crate) fn grid_before(tr: &Element) -> usize {
    tr.child("trPr")
        .and_then(|p| p.child_val("gridBefore"))
        .and_then(parse_int)
        .map_or(0, |n| n.max(0) as usize)
}

/// `w:gridSpan` of a cell, at least 1.
pub(crate) fn grid_span(tc: &Element) -> usize {
    tc.child("tcPr")
        .and_then(|p| p.child_val("gridSpan"))
        .and_then(parse_int)
        .map_or(1, |n| n.max(1) as usize)
}

/// Lay out every direct `w:tc` of each row on the grid and compute rowspans.
///
/// A `continue` cell merges into the chain open at the same grid column in
/// the previous row. A `continue` cell with nothing open above it starts a
/// chain of its own.
pub fn plan_rows(rows: &[&Element]) -> Vec<Vec<CellPlan>> {
    let mut plan: Vec<Vec<CellPlan>> = Vec::with_capacity(rows.len());
    // Origin (row, cell) of the merge chain open at each grid column.
    let mut open: Vec<Option<(usize, usize)>> = Vec::new();

    for (r, tr) in rows.iter().enumerate() {
        let mut cells = Vec::new();
        let mut next_open: Vec<Option<(usize, usize)>> = Vec::new();
        let mut col = grid_before(tr);

        for (i, tc) in tr.children_named("tc").enumerate() {
            let colspan = grid_span(tc);
            let state = tc.child("tcPr").and_then(VMergeState::of);
            let mut rowspan = 1;
            let origin = match state {
                Some(VMergeState::Continue) => match open.get(col).copied().flatten() {
                    Some((orow, ocell)) => {
                        plan[orow][ocell].rowspan += 1;
                        rowspan = 0;
                        Some((orow, ocell))
                    },
                    None => {
                        trace!("Row {} column {}: vMerge continue without origin", r, col);
                        Some((r, i))
                    },
                },
                Some(VMergeState::Restart) => Some((r, i)),
                None => None,
            };
            if next_open.len() <= col {
                next_open.resize(col + 1, None);
            }
            next_open[col] = origin;
            cells.push(CellPlan {
                col,
                colspan,
                rowspan,
            });
            col += colspan;
        }

        plan.push(cells);
        open = next_open;
    }
    plan
}

/// Per-column countdown of rows still covered by a cell above.
///
/// Used when writing rows back: a Document Tree row lists only the cells
/// that start in it, so the columns covered by a rowspan from above must be
/// filled with `continue` cells.
#[derive(Debug, Clone, Default)]
pub struct RowspanTracker {
    remaining: Vec<u32>,
    /// Colspan of the covering cell, at the column where it starts
    spans: Vec<usize>,
}

impl RowspanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next row.
    pub fn start_row(&mut self) {
        for r in &mut self.remaining {
            *r = r.saturating_sub(1);
        }
    }

    /// Record a cell placed at `col` in the current row.
    pub fn record(&mut self, col: usize, colspan: usize, rowspan: u32) {
        let end = col + colspan.max(1);
        if self.remaining.len() < end {
            self.remaining.resize(end, 0);
            self.spans.resize(end, 0);
        }
        for c in col..end {
            self.remaining[c] = rowspan;
            self.spans[c] = 0;
        }
        self.spans[col] = colspan.max(1);
    }

    /// Colspan of the cell covering `col` from above, if `col` is where it
    /// starts.
    pub fn covered_at(&self, col: usize) -> Option<usize> {
        match (self.remaining.get(col), self.spans.get(col)) {
            (Some(&r), Some(&s)) if r > 0 && s > 0 => Some(s),
            _ => None,
        }
    }

    /// First covered column at or after `from`, with its colspan.
    pub fn next_covered(&self, from: usize) -> Option<(usize, usize)> {
        (from..self.remaining.len()).find_map(|c| self.covered_at(c).map(|s| (c, s)))
    }
}
