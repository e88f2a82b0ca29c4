//! Pointer-driven placement preview.
//!
//! The anchor is the cell whose center is nearest the pointer, not a strict
//! point-in-polygon hit: cells are small next to pointer precision, and the
//! nearest-center rule always resolves to something. Swapping in an exact
//! polygon hit test would not change anything below this module.

use std::collections::HashSet;

use crate::geometry::Point;
use crate::grid::{CellId, GridCell, RoomGrid, Surface};

use super::{FootprintShape, PlacementValidator, Rejection};

/// Live preview of a candidate placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub anchor_cell_id: CellId,
    pub footprint_cell_ids: Vec<CellId>,
    pub is_valid: bool,
    pub rejection: Option<Rejection>,
}

/// Nearest cell center to the pointer, after clamping the pointer to the grid's
/// bounding box so drags off the edge still land on an edge cell.
///
/// Only cells of `surface` are candidates when it is set.
pub fn nearest_cell<'g>(grid: &'g RoomGrid, pointer: &Point, surface: Option<Surface>) -> Option<&'g GridCell> {
    let clamped = grid.bounds().clamp(pointer);
    grid.cells_on(surface).min_by(|a, b| {
        a.center
            .distance_sq(&clamped)
            .total_cmp(&b.center.distance_sq(&clamped))
    })
}

/// Footprint and verdict for one anchor.
///
/// A shape taller or wider than the anchor's surface is out of bounds
/// everywhere and is rejected before any cells are built.
pub fn ghost_at(
    grid: &RoomGrid,
    anchor: CellId,
    shape: &FootprintShape,
    allowed_surface: Option<Surface>,
    occupied: &HashSet<CellId>,
) -> Ghost {
    let (rows, cols) = shape.extent();
    let divisions = grid.surface(anchor.surface).map_or(0, |surface| surface.divisions);
    if rows > divisions || cols > divisions {
        return Ghost {
            anchor_cell_id: anchor,
            footprint_cell_ids: Vec::new(),
            is_valid: false,
            rejection: Some(Rejection::OutOfBounds),
        };
    }
    let validator = PlacementValidator::new(grid.cell_ids(), occupied);
    let verdict = validator.validate(
        shape.resolve(&anchor),
        shape.expected_len(),
        anchor.surface,
        allowed_surface,
    );
    Ghost {
        anchor_cell_id: anchor,
        footprint_cell_ids: verdict.footprint,
        is_valid: verdict.is_valid,
        rejection: verdict.rejection,
    }
}

/// Resolve a pointer position into a ghost. `None` only for an empty grid.
pub fn ghost_for_pointer(
    grid: &RoomGrid,
    pointer: &Point,
    shape: &FootprintShape,
    allowed_surface: Option<Surface>,
    occupied: &HashSet<CellId>,
) -> Option<Ghost> {
    let cell = nearest_cell(grid, pointer, allowed_surface)?;
    Some(ghost_at(grid, cell.id, shape, allowed_surface, occupied))
}

/// First anchor, in scan order, whose footprint is in bounds, unoccupied and on
/// an allowed surface.
///
/// Scan order is surfaces in [`Surface::ALL`] order, each row-major. It is
/// a plain first fit; another heuristic could replace it without touching callers.
pub fn find_first_fit(
    grid: &RoomGrid,
    shape: &FootprintShape,
    allowed_surface: Option<Surface>,
    occupied: &HashSet<CellId>,
) -> Option<CellId> {
    grid.cells_on(allowed_surface)
        .map(|cell| cell.id)
        .find(|anchor| ghost_at(grid, *anchor, shape, allowed_surface, occupied).is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ImageSize, RoomLayout, ViewState};

    fn grid() -> RoomGrid {
        RoomGrid::generate(
            &RoomLayout::default(),
            &ImageSize::new(1200.0, 900.0),
            &ViewState::default(),
        )
        .unwrap()
    }

    fn id(s: &str) -> CellId {
        s.parse().unwrap()
    }

    #[test]
    fn test_pointer_on_center_picks_that_cell() {
        let grid = grid();
        let target = grid.cell(&id("floor-4-7")).unwrap();
        let cell = nearest_cell(&grid, &target.center, None).unwrap();
        assert_eq!(cell.id, target.id);
    }

    #[test]
    fn test_far_pointer_clamps_to_edge_cell() {
        let grid = grid();
        let cell = nearest_cell(&grid, &Point::new(-5000.0, 100_000.0), Some(Surface::Floor)).unwrap();
        assert_eq!(cell.surface(), Surface::Floor);
        // Bottom-left of the screen maps onto the floor's outer rows
        assert!(cell.id.row == 12 || cell.id.col == 1);
    }

    #[test]
    fn test_surface_filter_limits_candidates() {
        let grid = grid();
        let wall_cell = grid.cell(&id("leftWall-6-6")).unwrap();
        let cell = nearest_cell(&grid, &wall_cell.center, Some(Surface::Floor)).unwrap();
        assert_eq!(cell.surface(), Surface::Floor);
    }

    #[test]
    fn test_ghost_reports_occupancy() {
        let grid = grid();
        let occupied: HashSet<CellId> = [id("floor-5-6")].into_iter().collect();
        let ghost = ghost_at(&grid, id("floor-5-5"), &FootprintShape::rect(1, 2), None, &occupied);
        assert!(!ghost.is_valid);
        assert_eq!(ghost.rejection, Some(Rejection::Occupied));
        assert_eq!(ghost.footprint_cell_ids, vec![id("floor-5-5"), id("floor-5-6")]);
    }

    #[test]
    fn test_first_fit_skips_taken_cells() {
        let grid = grid();
        let occupied: HashSet<CellId> = [id("floor-1-1"), id("floor-1-2")].into_iter().collect();
        let anchor = find_first_fit(&grid, &FootprintShape::rect(1, 1), None, &occupied);
        assert_eq!(anchor, Some(id("floor-1-3")));
    }

    #[test]
    fn test_first_fit_respects_surface() {
        let grid = grid();
        let occupied = HashSet::new();
        let anchor = find_first_fit(
            &grid,
            &FootprintShape::rect(2, 2),
            Some(Surface::RightWall),
            &occupied,
        );
        assert_eq!(anchor, Some(id("rightWall-1-1")));
    }

    #[test]
    fn test_first_fit_none_when_too_big() {
        let grid = grid();
        let occupied = HashSet::new();
        assert!(find_first_fit(&grid, &FootprintShape::rect(13, 1), None, &occupied).is_none());
    }

    #[test]
    fn test_huge_shape_rejected_without_cells() {
        let grid = grid();
        let occupied = HashSet::new();
        let shape = FootprintShape::rect(70_000, 70_000);
        let ghost = ghost_at(&grid, id("floor-1-1"), &shape, None, &occupied);
        assert!(!ghost.is_valid);
        assert_eq!(ghost.rejection, Some(Rejection::OutOfBounds));
        assert!(ghost.footprint_cell_ids.is_empty());
        assert!(find_first_fit(&grid, &shape, None, &occupied).is_none());
    }
}
