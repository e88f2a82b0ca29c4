use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::{CellId, MAX_DIVISIONS};

use super::Rotation;

/// No surface has more cells than this, so no larger footprint can be valid
pub const MAX_FOOTPRINT_CELLS: u32 = MAX_DIVISIONS * MAX_DIVISIONS;

/// Cells spanned by a rectangular item anchored at its top-left cell:
/// rows `[row, row + x_length)` by columns `[col, col + y_length)`, row-major.
///
/// Ids past the grid edge are still produced; bounds are the validator's job.
/// A rectangle bigger than [`MAX_FOOTPRINT_CELLS`] yields no cells at all,
/// which the validator rejects as incomplete.
pub fn footprint(anchor: &CellId, x_length: u32, y_length: u32) -> Vec<CellId> {
    let Some(len) = x_length
        .checked_mul(y_length)
        .filter(|len| *len <= MAX_FOOTPRINT_CELLS)
    else {
        return Vec::new();
    };
    let mut cells = Vec::with_capacity(len as usize);
    for dr in 0..x_length {
        for dc in 0..y_length {
            let (Some(row), Some(col)) = (anchor.row.checked_add(dr), anchor.col.checked_add(dc)) else {
                continue;
            };
            cells.push(CellId::new(anchor.surface, row, col));
        }
    }
    cells
}

/// Row and column span of a cell list (bounding box size), ignoring surfaces
pub fn shape_span(cells: &[CellId]) -> Option<(u32, u32)> {
    let first = cells.first()?;
    let (mut top, mut bottom, mut left, mut right) = (first.row, first.row, first.col, first.col);
    for cell in cells {
        top = top.min(cell.row);
        bottom = bottom.max(cell.row);
        left = left.min(cell.col);
        right = right.max(cell.col);
    }
    Some((bottom - top + 1, right - left + 1))
}

/// Whether `cells` is a usable shape for a `rows x cols` item: non-empty,
/// distinct, on one surface and no wider or taller than the item.
pub fn shape_fits(cells: &[CellId], rows: u32, cols: u32) -> bool {
    let Some((span_rows, span_cols)) = shape_span(cells) else {
        return false;
    };
    let distinct: HashSet<&CellId> = cells.iter().collect();
    distinct.len() == cells.len()
        && cells.iter().all(|cell| cell.surface == cells[0].surface)
        && span_rows <= rows
        && span_cols <= cols
}

/// Move an explicit shape so its first cell lands on `anchor`.
///
/// Cells pushed above row 1 or left of column 1 are dropped, which leaves
/// the footprint short and therefore invalid.
pub fn translate_shape(shape: &[CellId], anchor: &CellId) -> Vec<CellId> {
    let Some(origin) = shape.first() else {
        return Vec::new();
    };
    let d_row = i64::from(anchor.row) - i64::from(origin.row);
    let d_col = i64::from(anchor.col) - i64::from(origin.col);
    shape
        .iter()
        .filter_map(|cell| {
            let moved = cell.translate(d_row, d_col)?;
            Some(CellId::new(anchor.surface, moved.row, moved.col))
        })
        .collect()
}

/// Dimensions plus rotation, or an explicit cell list for irregular shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintShape {
    pub x_length: u32,
    pub y_length: u32,
    #[serde(default)]
    pub rotation: Rotation,
    /// Overrides the rectangle; already reflects any rotation
    #[serde(default)]
    pub explicit: Option<Vec<CellId>>,
}

impl FootprintShape {
    pub fn rect(x_length: u32, y_length: u32) -> Self {
        Self {
            x_length,
            y_length,
            rotation: Rotation::Deg0,
            explicit: None,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_explicit(mut self, cells: Vec<CellId>) -> Self {
        self.explicit = Some(cells);
        self
    }

    /// Row and column extents after rotation
    pub fn effective_dims(&self) -> (u32, u32) {
        self.rotation.apply(self.x_length, self.y_length)
    }

    /// How many cells a complete footprint has
    pub fn expected_len(&self) -> usize {
        match &self.explicit {
            Some(cells) => cells.len(),
            None => (self.x_length as usize).saturating_mul(self.y_length as usize),
        }
    }

    /// Rows and columns the resolved footprint spans
    pub fn extent(&self) -> (u32, u32) {
        match &self.explicit {
            Some(cells) => shape_span(cells).unwrap_or((0, 0)),
            None => self.effective_dims(),
        }
    }

    pub fn resolve(&self, anchor: &CellId) -> Vec<CellId> {
        match &self.explicit {
            Some(cells) => translate_shape(cells, anchor),
            None => {
                let (rows, cols) = self.effective_dims();
                footprint(anchor, rows, cols)
            }
        }
    }
}
