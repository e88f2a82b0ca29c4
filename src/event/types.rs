use serde::{Deserialize, Serialize};

use crate::grid::{CellId, ViewState};
use crate::placement::{DragConstraints, ItemId, PlacedId, PlacedItem};

/// One gesture or host update, as read from a JSON-lines gesture file.
///
/// Coordinates are screen space, the same space the grid is generated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Pan/zoom changed
    View(ViewState),
    /// The base image was measured
    Image { width: f32, height: f32 },
    /// Pick an item from the inventory. Without constraints the catalog entry is used.
    StartFromInventory {
        item_id: ItemId,
        #[serde(default)]
        constraints: Option<DragConstraints>,
    },
    StartFromPlaced { placed_id: PlacedId },
    PointerDown { pointer_id: u64, x: f32, y: f32 },
    PointerMove { pointer_id: u64, x: f32, y: f32 },
    PointerUp { pointer_id: u64 },
    PointerLeave,
    /// Hover a cell directly, bypassing the nearest-center search
    Hover { cell_id: CellId },
    Rotate,
    Stage,
    Commit,
    Cancel,
    Delete,
    LoadDraft { items: Vec<PlacedItem> },
}

impl RoomEvent {
    /// The `type` tag, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RoomEvent::View(_) => "view",
            RoomEvent::Image { .. } => "image",
            RoomEvent::StartFromInventory { .. } => "start_from_inventory",
            RoomEvent::StartFromPlaced { .. } => "start_from_placed",
            RoomEvent::PointerDown { .. } => "pointer_down",
            RoomEvent::PointerMove { .. } => "pointer_move",
            RoomEvent::PointerUp { .. } => "pointer_up",
            RoomEvent::PointerLeave => "pointer_leave",
            RoomEvent::Hover { .. } => "hover",
            RoomEvent::Rotate => "rotate",
            RoomEvent::Stage => "stage",
            RoomEvent::Commit => "commit",
            RoomEvent::Cancel => "cancel",
            RoomEvent::Delete => "delete",
            RoomEvent::LoadDraft { .. } => "load_draft",
        }
    }
}
