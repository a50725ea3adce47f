//! Reading-order assignment: rows, row groups, columns, ids.
//!
//! Turns an unordered set of panel bounding boxes into the sequence a
//! reader would traverse (left-to-right, top-to-bottom). The difficult
//! case is a tall panel standing beside two stacked shorter panels: the
//! tall panel spans what would otherwise be two rows, and naive
//! sort-by-y-then-x ordering interleaves the stacked panels with
//! whatever sits beside them.
//!
//! The algorithm runs in four steps:
//!
//! 1. **Initial row grouping**: sort by top edge and partition into
//!    rows by top-edge proximity (within `tolerance` pixels of the
//!    row's first panel). A tall panel lands in whichever row its top
//!    falls into.
//! 2. **Row-group merging**: a subsequent row is absorbed into the
//!    current group when its top edge sits above the group's span
//!    threshold, the maximum over the group of
//!    `y + height *` [`ROW_SPAN_FRACTION`]. This pulls rows nested
//!    inside a taller panel's vertical span into one group, while the
//!    20% slack keeps genuinely separate row bands below a tall panel
//!    from being swallowed on slightly skewed scans.
//! 3. **Column grouping**: within each group, partition into columns
//!    by left-edge proximity (same tolerance rule), columns ordered by
//!    minimum x.
//! 4. **Final ordering**: top-to-bottom within each column, columns
//!    left-to-right, groups top-to-bottom; ids assigned `0..N-1` along
//!    that concatenation.
//!
//! With the five-panel layout below, the middle panel spans both rows
//! and the result reads 1 → 2 → 3 → 4 → 5:
//!
//! ```text
//! +---+ +-----+ +---+
//! | 1 | |     | | 4 |
//! +---+ |  3  | +---+
//! +---+ |     | +---+
//! | 2 | |     | | 5 |
//! +---+ +-----+ +---+
//! ```
//!
//! All comparisons are on integer pixel coordinates with deterministic
//! tie-breaking, so identical input always yields identical order.

use crate::types::{BoundingBox, Panel};

/// Fraction of a panel's height used for the row-group span threshold.
pub const ROW_SPAN_FRACTION: f64 = 0.8;

/// Assign reading-order ids to a set of panel bounding boxes.
///
/// Returns one [`Panel`] per input box with ids `0..N-1` in reading
/// order; the geometry is carried over unchanged. An empty input yields
/// an empty output; a single box yields id 0.
#[must_use = "returns the panels in reading order"]
pub fn assign_reading_order(boxes: Vec<BoundingBox>, tolerance: u32) -> Vec<Panel> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let rows = group_rows(boxes, tolerance);
    let groups = merge_row_groups(rows);

    let mut panels = Vec::new();
    for group in groups {
        for mut column in group_columns(group, tolerance) {
            column.sort_by_key(|b| (b.y, b.x));
            for bounds in column {
                #[allow(clippy::cast_possible_truncation)]
                let id = panels.len() as u32;
                panels.push(Panel::from_bounds(id, bounds));
            }
        }
    }
    panels
}

/// Step 1: partition boxes into rows by top-edge proximity.
///
/// Boxes are sorted by `(y, x)`; a box joins the current row iff its top
/// edge is within `tolerance` of the row's first box, otherwise it
/// starts a new row. Rows come out in top-to-bottom order and are never
/// empty.
fn group_rows(mut boxes: Vec<BoundingBox>, tolerance: u32) -> Vec<Vec<BoundingBox>> {
    boxes.sort_by_key(|b| (b.y, b.x));

    let mut rows: Vec<Vec<BoundingBox>> = Vec::new();
    let mut row_y = 0;
    for b in boxes {
        match rows.last_mut() {
            Some(row) if b.y.abs_diff(row_y) <= tolerance => row.push(b),
            _ => {
                row_y = b.y;
                rows.push(vec![b]);
            }
        }
    }
    rows
}

/// Step 2: absorb rows that start inside the current group's vertical
/// span into that group.
fn merge_row_groups(rows: Vec<Vec<BoundingBox>>) -> Vec<Vec<BoundingBox>> {
    let mut groups: Vec<Vec<BoundingBox>> = Vec::new();
    for row in rows {
        let row_top = row.iter().map(|b| b.y).min().unwrap_or(0);
        match groups.last_mut() {
            Some(group) if f64::from(row_top) <= span_threshold(group) => {
                group.extend(row);
            }
            _ => groups.push(row),
        }
    }
    groups
}

/// The y coordinate below which a row no longer counts as nested in the
/// group: the maximum over the group of `y + height * ROW_SPAN_FRACTION`.
fn span_threshold(group: &[BoundingBox]) -> f64 {
    group
        .iter()
        .map(|b| f64::from(b.y) + f64::from(b.height) * ROW_SPAN_FRACTION)
        .fold(0.0, f64::max)
}

/// Step 3: partition a row group into columns by left-edge proximity.
///
/// Same adjacency rule as [`group_rows`], applied to x. Because the
/// input is sorted by `(x, y)` first, columns come out ordered by their
/// minimum x.
fn group_columns(mut boxes: Vec<BoundingBox>, tolerance: u32) -> Vec<Vec<BoundingBox>> {
    boxes.sort_by_key(|b| (b.x, b.y));

    let mut columns: Vec<Vec<BoundingBox>> = Vec::new();
    let mut column_x = 0;
    for b in boxes {
        match columns.last_mut() {
            Some(column) if b.x.abs_diff(column_x) <= tolerance => column.push(b),
            _ => {
                column_x = b.x;
                columns.push(vec![b]);
            }
        }
    }
    columns
}
