use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

use super::generator::{generate_surface_grid, ImageSize, SurfaceGrid, ViewState, DEFAULT_DIVISIONS};
use super::{CellId, GridCell, Surface, SurfaceCorners};

/// Which surfaces a room has and where they sit on the base image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    #[serde(default = "default_divisions")]
    pub divisions: u32,
    pub surfaces: BTreeMap<Surface, SurfaceCorners>,
}

fn default_divisions() -> u32 {
    DEFAULT_DIVISIONS
}

impl RoomLayout {
    pub fn new(divisions: u32) -> Self {
        Self {
            divisions,
            surfaces: BTreeMap::new(),
        }
    }

    pub fn with_surface(mut self, surface: Surface, corners: SurfaceCorners) -> Self {
        self.surfaces.insert(surface, corners);
        self
    }

    /// Whether the cell exists on this layout's grid, measured or not
    pub fn contains(&self, cell: &CellId) -> bool {
        self.surfaces.contains_key(&cell.surface)
            && (1..=self.divisions).contains(&cell.row)
            && (1..=self.divisions).contains(&cell.col)
    }
}

impl Default for RoomLayout {
    /// The corner-view room: floor diamond at the bottom, two walls meeting in the middle.
    fn default() -> Self {
        RoomLayout::new(DEFAULT_DIVISIONS)
            .with_surface(
                Surface::Floor,
                SurfaceCorners::new(
                    Point::new(0.5, 0.55),
                    Point::new(0.95, 0.75),
                    Point::new(0.5, 0.98),
                    Point::new(0.05, 0.75),
                ),
            )
            .with_surface(
                Surface::LeftWall,
                SurfaceCorners::new(
                    Point::new(0.05, 0.1),
                    Point::new(0.5, 0.02),
                    Point::new(0.5, 0.55),
                    Point::new(0.05, 0.75),
                ),
            )
            .with_surface(
                Surface::RightWall,
                SurfaceCorners::new(
                    Point::new(0.5, 0.02),
                    Point::new(0.95, 0.1),
                    Point::new(0.95, 0.75),
                    Point::new(0.5, 0.55),
                ),
            )
    }
}

/// All surface grids of a room for one pan/zoom/image-size state.
///
/// Never mutated in place: a change of any input produces a new `RoomGrid`.
/// The id set and bounds are derived once here and shared by every lookup.
#[derive(Debug, Clone)]
pub struct RoomGrid {
    surfaces: Vec<SurfaceGrid>,
    ids: HashSet<CellId>,
    bounds: Bounds,
}

impl RoomGrid {
    /// `None` while the image has no measured size or the layout has no surfaces.
    pub fn generate(layout: &RoomLayout, image: &ImageSize, view: &ViewState) -> Option<RoomGrid> {
        let surfaces: Vec<SurfaceGrid> = Surface::ALL
            .iter()
            .filter_map(|surface| {
                let corners = layout.surfaces.get(surface)?;
                generate_surface_grid(*surface, corners, layout.divisions, image, view)
            })
            .collect();
        RoomGrid::from_surfaces(surfaces)
    }

    pub fn from_surfaces(surfaces: Vec<SurfaceGrid>) -> Option<RoomGrid> {
        let ids: HashSet<CellId> = surfaces
            .iter()
            .flat_map(|grid| grid.cells.iter().map(|cell| cell.id))
            .collect();
        let bounds = Bounds::from_points(
            surfaces
                .iter()
                .flat_map(|grid| grid.cells.iter())
                .flat_map(|cell| cell.vertices.corners().iter()),
        )?;
        Some(RoomGrid {
            surfaces,
            ids,
            bounds,
        })
    }

    pub fn surfaces(&self) -> &[SurfaceGrid] {
        &self.surfaces
    }

    pub fn surface(&self, surface: Surface) -> Option<&SurfaceGrid> {
        self.surfaces.iter().find(|grid| grid.surface == surface)
    }

    /// Every cell, surfaces in scan order, each row-major
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.surfaces.iter().flat_map(|grid| grid.cells.iter())
    }

    /// Cells of one surface, or of every surface when `surface` is `None`
    pub fn cells_on(&self, surface: Option<Surface>) -> impl Iterator<Item = &GridCell> {
        self.surfaces
            .iter()
            .filter(move |grid| surface.map_or(true, |s| grid.surface == s))
            .flat_map(|grid| grid.cells.iter())
    }

    pub fn cell(&self, id: &CellId) -> Option<&GridCell> {
        self.surface(id.surface)?.cell(id.row, id.col)
    }

    pub fn contains(&self, id: &CellId) -> bool {
        self.ids.contains(id)
    }

    pub fn cell_ids(&self) -> &HashSet<CellId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Min/max over every cell vertex
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The surface whose outline contains the point, if any
    pub fn surface_at(&self, p: &Point) -> Option<Surface> {
        self.surfaces
            .iter()
            .find(|grid| grid.contains(p))
            .map(|grid| grid.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RoomGrid {
        RoomGrid::generate(
            &RoomLayout::default(),
            &ImageSize::new(800.0, 600.0),
            &ViewState::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_room_has_three_surfaces() {
        let grid = grid();
        assert_eq!(grid.surfaces().len(), 3);
        assert_eq!(grid.len(), 3 * 144);
        assert!(grid.contains(&CellId::new(Surface::RightWall, 12, 12)));
        assert!(!grid.contains(&CellId::new(Surface::Floor, 13, 1)));
    }

    #[test]
    fn test_cells_iterate_in_scan_order() {
        let grid = grid();
        let ids: Vec<String> = grid.cells().map(|c| c.id.to_string()).collect();
        assert_eq!(ids[0], "floor-1-1");
        assert_eq!(ids[144], "leftWall-1-1");
        assert_eq!(ids[288], "rightWall-1-1");
        assert_eq!(grid.cells_on(Some(Surface::LeftWall)).count(), 144);
    }

    #[test]
    fn test_bounds_cover_all_vertices() {
        let grid = grid();
        let bounds = grid.bounds();
        for cell in grid.cells() {
            for v in cell.vertices.corners() {
                assert!(bounds.contains(v));
            }
        }
    }

    #[test]
    fn test_no_grid_before_layout() {
        let grid = RoomGrid::generate(
            &RoomLayout::default(),
            &ImageSize::new(0.0, 600.0),
            &ViewState::default(),
        );
        assert!(grid.is_none());
        let empty = RoomGrid::generate(
            &RoomLayout::new(12),
            &ImageSize::new(800.0, 600.0),
            &ViewState::default(),
        );
        assert!(empty.is_none());
    }

    #[test]
    fn test_surface_at_point() {
        let grid = grid();
        let floor_center = grid.surface(Surface::Floor).unwrap().polygon.centroid();
        assert_eq!(grid.surface_at(&floor_center), Some(Surface::Floor));
    }
}
