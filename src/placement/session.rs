use serde::{Deserialize, Serialize};

use crate::grid::{CellId, Surface, MAX_DIVISIONS};

use super::{shape_fits, CatalogItem, FootprintShape, Ghost, ItemId, PlacedId, PlacedItem, Rotation};

/// Where the drag state machine is.
///
/// `Idle -> Dragging -> Staged -> Idle`, where leaving to `Idle` is a commit,
/// cancel or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Dragging,
    Staged,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Committed,
    Cancelled,
    Deleted,
    /// A preview session was confirmed; nothing was merged
    Previewed,
}

/// Constraints for a drag that starts from the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConstraints {
    #[serde(default)]
    pub allowed_surface: Option<Surface>,
    pub x_length: u32,
    pub y_length: u32,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub footprint_override: Option<Vec<CellId>>,
    /// Preview placements stage but never merge into the draft
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub image_url: String,
}

impl DragConstraints {
    pub fn new(x_length: u32, y_length: u32) -> Self {
        Self {
            allowed_surface: None,
            x_length,
            y_length,
            rotation: Rotation::Deg0,
            footprint_override: None,
            preview: false,
            image_url: String::new(),
        }
    }

    pub fn for_item(item: &CatalogItem) -> Self {
        Self {
            allowed_surface: item.allowed_surface,
            image_url: item.image_url.clone(),
            ..Self::new(item.x_length, item.y_length)
        }
    }

    pub fn on_surface(mut self, surface: Surface) -> Self {
        self.allowed_surface = Some(surface);
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// False for shapes no grid can hold: a zero or oversized extent, or an
    /// explicit footprint that is empty, repeats a cell or overflows the extent.
    pub fn is_well_formed(&self) -> bool {
        let (rows, cols) = self.rotation.apply(self.x_length, self.y_length);
        if rows == 0 || cols == 0 || rows > MAX_DIVISIONS || cols > MAX_DIVISIONS {
            return false;
        }
        match &self.footprint_override {
            Some(cells) => shape_fits(cells, rows, cols),
            None => true,
        }
    }

    pub fn shape(&self) -> FootprintShape {
        FootprintShape {
            x_length: self.x_length,
            y_length: self.y_length,
            rotation: self.rotation,
            explicit: self.footprint_override.clone(),
        }
    }
}

/// The pointer that owns the session, so other touches can be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerClaim {
    pub pointer_id: Option<u64>,
    /// Visual drag-follow; cleared when the pointer leaves, the session stays
    pub dragging: bool,
}

/// A drag in progress, from pickup to commit, cancel or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item_id: ItemId,
    /// Id the placement will carry: the origin's id for re-placements
    pub placed_id: PlacedId,
    /// Present exactly when this re-places an existing item
    pub origin_placed_id: Option<PlacedId>,
    pub original_item: Option<PlacedItem>,
    /// Index the original held in the draft, for exact rollback
    pub original_index: Option<usize>,
    pub hover_cell_id: Option<CellId>,
    pub allowed_surface: Option<Surface>,
    pub shape: FootprintShape,
    pub preview: bool,
    pub image_url: String,
    pub offset_x: f32,
    pub offset_y: f32,
    pub pointer: PointerClaim,
    pub phase: SessionPhase,
    /// Auto-placement exhaustion is reported once per session
    pub placement_failure_reported: bool,
}

impl DragSession {
    pub fn from_inventory(item_id: ItemId, placed_id: PlacedId, constraints: DragConstraints) -> Self {
        Self {
            item_id,
            placed_id,
            origin_placed_id: None,
            original_item: None,
            original_index: None,
            hover_cell_id: None,
            allowed_surface: constraints.allowed_surface,
            shape: constraints.shape(),
            preview: constraints.preview,
            image_url: constraints.image_url,
            offset_x: 0.0,
            offset_y: 0.0,
            pointer: PointerClaim::default(),
            phase: SessionPhase::Dragging,
            placement_failure_reported: false,
        }
    }

    /// Start from an item lifted off the grid; its own footprint is the starting shape
    pub fn from_placed(item: PlacedItem, index: usize, allowed_surface: Option<Surface>) -> Self {
        Self {
            item_id: item.item_id.clone(),
            placed_id: item.id.clone(),
            origin_placed_id: Some(item.id.clone()),
            hover_cell_id: Some(item.anchor_cell_id),
            allowed_surface,
            shape: item.shape(),
            preview: false,
            image_url: item.image_url.clone(),
            offset_x: item.offset_x,
            offset_y: item.offset_y,
            original_item: Some(item),
            original_index: Some(index),
            pointer: PointerClaim::default(),
            phase: SessionPhase::Dragging,
            placement_failure_reported: false,
        }
    }

    pub fn is_replacement(&self) -> bool {
        self.origin_placed_id.is_some()
    }

    pub fn needs_auto_placement(&self) -> bool {
        !self.is_replacement() && self.hover_cell_id.is_none()
    }

    /// Build the candidate item for a ghost
    pub fn materialize(&self, ghost: &Ghost) -> PendingPlacement {
        PendingPlacement {
            item: PlacedItem {
                id: self.placed_id.clone(),
                item_id: self.item_id.clone(),
                anchor_cell_id: ghost.anchor_cell_id,
                footprint_cell_ids: ghost.footprint_cell_ids.clone(),
                x_length: self.shape.x_length,
                y_length: self.shape.y_length,
                rotation: self.shape.rotation,
                surface: ghost.anchor_cell_id.surface,
                offset_x: self.offset_x,
                offset_y: self.offset_y,
                image_url: self.image_url.clone(),
            },
            preview: self.preview,
        }
    }
}

/// A fully formed placement waiting for confirmation. At most one per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingPlacement {
    pub item: PlacedItem,
    pub preview: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::footprint;

    fn placed() -> PlacedItem {
        let anchor = CellId::new(Surface::Floor, 2, 2);
        PlacedItem {
            id: "placed-7".to_string(),
            item_id: "lamp".to_string(),
            anchor_cell_id: anchor,
            footprint_cell_ids: footprint(&anchor, 1, 1),
            x_length: 1,
            y_length: 1,
            rotation: Rotation::Deg180,
            surface: Surface::Floor,
            offset_x: 3.0,
            offset_y: -1.5,
            image_url: "lamp.png".to_string(),
        }
    }

    #[test]
    fn test_replacement_keeps_identity() {
        let session = DragSession::from_placed(placed(), 4, None);
        assert!(session.is_replacement());
        assert!(!session.needs_auto_placement());
        assert_eq!(session.placed_id, "placed-7");
        assert_eq!(session.hover_cell_id, Some(CellId::new(Surface::Floor, 2, 2)));
        assert_eq!(session.shape.rotation, Rotation::Deg180);
    }

    #[test]
    fn test_materialize_carries_session_fields() {
        let session = DragSession::from_placed(placed(), 0, None);
        let anchor = CellId::new(Surface::Floor, 5, 5);
        let ghost = Ghost {
            anchor_cell_id: anchor,
            footprint_cell_ids: vec![anchor],
            is_valid: true,
            rejection: None,
        };
        let pending = session.materialize(&ghost);
        assert_eq!(pending.item.id, "placed-7");
        assert_eq!(pending.item.anchor_cell_id, anchor);
        assert_eq!(pending.item.offset_x, 3.0);
        assert_eq!(pending.item.rotation, Rotation::Deg180);
        assert!(!pending.preview);
    }

    #[test]
    fn test_constraints_well_formed() {
        assert!(DragConstraints::new(2, 3).is_well_formed());
        assert!(!DragConstraints::new(0, 3).is_well_formed());
        assert!(!DragConstraints::new(70_000, 70_000).is_well_formed());
        assert!(!DragConstraints::new(MAX_DIVISIONS + 1, 1).is_well_formed());

        let mut shaped = DragConstraints::new(2, 2);
        shaped.footprint_override = Some(vec![
            CellId::new(Surface::Floor, 1, 1),
            CellId::new(Surface::Floor, 2, 1),
            CellId::new(Surface::Floor, 2, 2),
        ]);
        assert!(shaped.is_well_formed());
        shaped.footprint_override = Some(vec![CellId::new(Surface::Floor, 1, 1), CellId::new(Surface::Floor, 1, 3)]);
        assert!(!shaped.is_well_formed());
        shaped.footprint_override = Some(Vec::new());
        assert!(!shaped.is_well_formed());
    }

    #[test]
    fn test_replacement_keeps_explicit_shape() {
        let anchor = CellId::new(Surface::Floor, 5, 5);
        let mut item = placed();
        item.rotation = Rotation::Deg0;
        item.anchor_cell_id = anchor;
        item.x_length = 2;
        item.y_length = 2;
        item.footprint_cell_ids = vec![anchor, CellId::new(Surface::Floor, 6, 5), CellId::new(Surface::Floor, 6, 6)];
        let session = DragSession::from_placed(item.clone(), 0, None);
        assert_eq!(session.shape.explicit.as_deref(), Some(item.footprint_cell_ids.as_slice()));
        assert_eq!(session.shape.resolve(&anchor), item.footprint_cell_ids);
    }

    #[test]
    fn test_inventory_session_waits_for_auto_placement() {
        let constraints = DragConstraints::new(2, 1).on_surface(Surface::LeftWall).preview(true);
        let session = DragSession::from_inventory("frame".to_string(), "placed-1".to_string(), constraints);
        assert!(session.needs_auto_placement());
        assert!(session.preview);
        assert_eq!(session.allowed_surface, Some(Surface::LeftWall));
        assert_eq!(session.phase, SessionPhase::Dragging);
    }
}
