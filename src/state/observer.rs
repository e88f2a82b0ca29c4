use serde::Serialize;

use crate::placement::{EndReason, ItemId, PlacedId};

use super::PlacementStore;

/// Something that changed in a [`PlacementStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    GridChanged { version: u64 },
    DraftChanged { version: u64, items: usize },
    GhostChanged { valid: Option<bool> },
    SessionStarted { item_id: ItemId, placed_id: PlacedId, replacement: bool },
    Staged { placed_id: PlacedId },
    SessionEnded { placed_id: PlacedId, reason: EndReason },
    /// Auto-placement found no free spot; the caller should abort the drag
    PlacementFailed { item_id: ItemId },
}

/// Handle returned by [`PlacementStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Receives store notifications after each transition completes.
///
/// Optional capabilities (activity logs, overlays, sound) hang off the store
/// this way instead of living inside the transitions.
pub trait PlacementObserver {
    fn on_event(&mut self, event: &StoreEvent, store: &PlacementStore);
}

impl<F> PlacementObserver for F
where
    F: FnMut(&StoreEvent, &PlacementStore),
{
    fn on_event(&mut self, event: &StoreEvent, store: &PlacementStore) {
        self(event, store)
    }
}
