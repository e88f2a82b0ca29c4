use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::grid::{CellId, Surface};

/// Why a candidate footprint can't be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Fewer (or repeated) cells than the item needs
    Incomplete,
    /// A cell that doesn't exist on the target surface
    OutOfBounds,
    /// The item may not go on this surface
    SurfaceMismatch,
    /// A cell already taken by another draft item
    Occupied,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::Incomplete => "footprint incomplete",
            Rejection::OutOfBounds => "off the grid",
            Rejection::SurfaceMismatch => "wrong surface",
            Rejection::Occupied => "space taken",
        };
        f.write_str(text)
    }
}

/// Outcome of validating a footprint. The footprint travels with the
/// verdict so renderer and session stage exactly what was checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    pub footprint: Vec<CellId>,
    pub rejection: Option<Rejection>,
}

/// Checks candidate footprints against one grid and one occupancy set.
pub struct PlacementValidator<'a> {
    grid_ids: &'a HashSet<CellId>,
    occupied: &'a HashSet<CellId>,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(grid_ids: &'a HashSet<CellId>, occupied: &'a HashSet<CellId>) -> Self {
        Self { grid_ids, occupied }
    }

    /// Valid only when the footprint is complete, on the grid, on an allowed
    /// surface, and clear of occupied cells. `allowed_surface = None` accepts any.
    pub fn validate(
        &self,
        footprint: Vec<CellId>,
        expected_len: usize,
        target: Surface,
        allowed_surface: Option<Surface>,
    ) -> Verdict {
        let rejection = self.rejection(&footprint, expected_len, target, allowed_surface);
        Verdict {
            is_valid: rejection.is_none(),
            footprint,
            rejection,
        }
    }

    fn rejection(
        &self,
        footprint: &[CellId],
        expected_len: usize,
        target: Surface,
        allowed_surface: Option<Surface>,
    ) -> Option<Rejection> {
        let distinct: HashSet<&CellId> = footprint.iter().collect();
        if expected_len == 0 || footprint.len() != expected_len || distinct.len() != expected_len {
            return Some(Rejection::Incomplete);
        }
        if footprint
            .iter()
            .any(|cell| cell.surface != target || !self.grid_ids.contains(cell))
        {
            return Some(Rejection::OutOfBounds);
        }
        if allowed_surface.is_some_and(|allowed| allowed != target) {
            return Some(Rejection::SurfaceMismatch);
        }
        if footprint.iter().any(|cell| self.occupied.contains(cell)) {
            return Some(Rejection::Occupied);
        }
        None
    }
}
