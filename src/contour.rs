//! Marching squares over a [`ScalarField`].
//!
//! Corners are packed into a 4-bit mask (top-left 8, top-right 4,
//! bottom-right 2, bottom-left 1); a corner is set when its sample is strictly
//! above the threshold.

use crate::field::{GridCell, ScalarField};

/// One straight crossing inside a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Segment {
    pub fn start(&self) -> (f32, f32) {
        (self.x1, self.y1)
    }

    pub fn end(&self) -> (f32, f32) {
        (self.x2, self.y2)
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

pub const MASK_TOP_LEFT: u8 = 8;
pub const MASK_TOP_RIGHT: u8 = 4;
pub const MASK_BOTTOM_RIGHT: u8 = 2;
pub const MASK_BOTTOM_LEFT: u8 = 1;

/// Edge pairs joined for each corner mask. Saddles (5 and 10) keep their two
/// crossings disjoint.
pub const EDGE_TABLE: [&[(Edge, Edge)]; 16] = {
    use Edge::*;
    [
        &[],
        &[(Left, Bottom)],
        &[(Bottom, Right)],
        &[(Left, Right)],
        &[(Top, Right)],
        &[(Left, Top), (Bottom, Right)],
        &[(Top, Bottom)],
        &[(Left, Top)],
        &[(Left, Top)],
        &[(Top, Bottom)],
        &[(Top, Right), (Left, Bottom)],
        &[(Top, Right)],
        &[(Left, Right)],
        &[(Bottom, Right)],
        &[(Left, Bottom)],
        &[],
    ]
};

/// Classify a cell against `threshold`.
#[inline]
pub fn cell_mask(cell: &GridCell, threshold: f32) -> u8 {
    let mut mask = 0u8;
    if cell.top_left > threshold {
        mask |= MASK_TOP_LEFT;
    }
    if cell.top_right > threshold {
        mask |= MASK_TOP_RIGHT;
    }
    if cell.bottom_right > threshold {
        mask |= MASK_BOTTOM_RIGHT;
    }
    if cell.bottom_left > threshold {
        mask |= MASK_BOTTOM_LEFT;
    }
    mask
}

/// Crossing point on `edge`. Horizontal edges run left to right and vertical
/// edges top to bottom, whichever cell asks, so two neighbours sharing an edge
/// compute bit-identical points.
pub fn edge_point(cell: &GridCell, edge: Edge, size: f32, threshold: f32) -> (f32, f32) {
    let (a, b, x0, y0, dx, dy) = match edge {
        Edge::Top => (cell.top_left, cell.top_right, cell.x, cell.y, size, 0.0),
        Edge::Bottom => (
            cell.bottom_left,
            cell.bottom_right,
            cell.x,
            cell.y + size,
            size,
            0.0,
        ),
        Edge::Left => (cell.top_left, cell.bottom_left, cell.x, cell.y, 0.0, size),
        Edge::Right => (
            cell.top_right,
            cell.bottom_right,
            cell.x + size,
            cell.y,
            0.0,
            size,
        ),
    };
    let t = (threshold - a) / (b - a);
    (x0 + dx * t, y0 + dy * t)
}

/// Segments for a single cell, appended to `out`. Segments with a non-finite
/// endpoint (equal corners on the crossing edge) are dropped.
pub fn cell_segments(cell: &GridCell, size: f32, threshold: f32, out: &mut Vec<Segment>) {
    let mask = cell_mask(cell, threshold);
    for &(ea, eb) in EDGE_TABLE[mask as usize] {
        let (x1, y1) = edge_point(cell, ea, size, threshold);
        let (x2, y2) = edge_point(cell, eb, size, threshold);
        let seg = Segment { x1, y1, x2, y2 };
        if seg.is_finite() {
            out.push(seg);
        }
    }
}

/// Every crossing of `threshold` across the whole field, in cell scan order.
pub fn extract(field: &ScalarField, threshold: f32) -> Vec<Segment> {
    let mut out = Vec::new();
    extract_into(field, threshold, &mut out);
    out
}

pub fn extract_into(field: &ScalarField, threshold: f32, out: &mut Vec<Segment>) {
    out.clear();
    if field.is_empty() || !threshold.is_finite() {
        return;
    }
    for row in 0..field.rows - 1 {
        for col in 0..field.cols - 1 {
            let cell = field.cell(col, row);
            cell_segments(&cell, field.cell_size, threshold, out);
        }
    }
}

/// `count` evenly spaced levels from `lo` to `hi` inclusive.
pub fn thresholds(count: usize, lo: f32, hi: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![(lo + hi) * 0.5],
        n => {
            let step = (hi - lo) / (n - 1) as f32;
            (0..n).map(|i| lo + step * i as f32).collect()
        }
    }
}
