use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RotationError;
use crate::grid::{CellId, Surface};

use super::{footprint, shape_fits, FootprintShape};

/// Identifier of a placed instance (two sofas share an item id, not a placed id)
pub type PlacedId = String;

/// Identifier of a catalog item
pub type ItemId = String;

/// Quarter-turn rotation of an item's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Next quarter turn clockwise
    pub fn next(&self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// 90 and 270 swap an item's row and column extents
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    pub fn apply(&self, x_length: u32, y_length: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (y_length, x_length)
        } else {
            (x_length, y_length)
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = RotationError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(RotationError(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Something occupying the grid.
///
/// `footprint_cell_ids` always has `x_length * y_length` entries for
/// rectangular items, every one a real cell on `surface`. Shaped items
/// (placed with an explicit footprint) hold fewer cells, all inside that
/// rectangle's extent; see [`PlacedItem::has_consistent_footprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: PlacedId,
    pub item_id: ItemId,
    pub anchor_cell_id: CellId,
    pub footprint_cell_ids: Vec<CellId>,
    pub x_length: u32,
    pub y_length: u32,
    #[serde(default)]
    pub rotation: Rotation,
    pub surface: Surface,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    #[serde(default)]
    pub image_url: String,
}

impl PlacedItem {
    pub fn occupies(&self, cell: &CellId) -> bool {
        self.footprint_cell_ids.contains(cell)
    }

    /// Row and column extents after rotation
    pub fn extent(&self) -> (u32, u32) {
        self.rotation.apply(self.x_length, self.y_length)
    }

    /// Whether the footprint is exactly the rectangle the dimensions describe
    pub fn is_rectangular(&self) -> bool {
        let (rows, cols) = self.extent();
        self.footprint_cell_ids == footprint(&self.anchor_cell_id, rows, cols)
    }

    /// The footprint is either the full rectangle at the anchor, or a smaller
    /// shape that contains the anchor and fits within the rectangle's extent.
    /// Cells are distinct and all on `surface` either way.
    pub fn has_consistent_footprint(&self) -> bool {
        let cells = &self.footprint_cell_ids;
        let (rows, cols) = self.extent();
        if !cells.contains(&self.anchor_cell_id)
            || cells.iter().any(|cell| cell.surface != self.surface)
            || !shape_fits(cells, rows, cols)
        {
            return false;
        }
        if cells.len() as u64 == u64::from(rows) * u64::from(cols) {
            let rect: HashSet<CellId> = footprint(&self.anchor_cell_id, rows, cols).into_iter().collect();
            return cells.iter().all(|cell| rect.contains(cell));
        }
        true
    }

    /// Shape to carry when the item is picked up again. Shaped items keep
    /// their cells, anchor first, so translation preserves the outline.
    pub fn shape(&self) -> FootprintShape {
        let rect = FootprintShape::rect(self.x_length, self.y_length).with_rotation(self.rotation);
        if self.is_rectangular() {
            return rect;
        }
        let mut cells = Vec::with_capacity(self.footprint_cell_ids.len());
        cells.push(self.anchor_cell_id);
        cells.extend(
            self.footprint_cell_ids
                .iter()
                .filter(|cell| **cell != self.anchor_cell_id),
        );
        rect.with_explicit(cells)
    }
}

/// Item metadata from the catalog service. Only used to fill drag defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: ItemId,
    #[serde(default)]
    pub image_url: String,
    pub x_length: u32,
    pub y_length: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub allowed_surface: Option<Surface>,
}
