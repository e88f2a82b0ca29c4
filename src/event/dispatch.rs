use tracing::trace;

use crate::geometry::Point;
use crate::grid::ImageSize;
use crate::state::PlacementStore;

use super::RoomEvent;

/// Apply one event to the store and return the transition's result.
///
/// Host updates (view, image, draft loads) always report `true`.
pub fn dispatch(store: &mut PlacementStore, event: &RoomEvent) -> bool {
    trace!(kind = event.kind(), "dispatch");
    match event {
        RoomEvent::View(view) => {
            store.set_view(*view);
            true
        }
        RoomEvent::Image { width, height } => {
            store.set_image_size(ImageSize::new(*width, *height));
            true
        }
        RoomEvent::StartFromInventory {
            item_id,
            constraints: Some(constraints),
        } => store.start_drag_from_inventory(item_id.clone(), constraints.clone()),
        RoomEvent::StartFromInventory {
            item_id,
            constraints: None,
        } => store.start_drag_from_catalog(item_id),
        RoomEvent::StartFromPlaced { placed_id } => store.start_drag_from_placed(placed_id),
        RoomEvent::PointerDown { pointer_id, x, y } => store.pointer_down(*pointer_id, Point::new(*x, *y)),
        RoomEvent::PointerMove { pointer_id, x, y } => store.pointer_move(*pointer_id, Point::new(*x, *y)),
        RoomEvent::PointerUp { pointer_id } => store.pointer_up(*pointer_id),
        RoomEvent::PointerLeave => {
            store.pointer_leave();
            true
        }
        RoomEvent::Hover { cell_id } => store.hover_cell(*cell_id),
        RoomEvent::Rotate => store.rotate_dragged_item(),
        RoomEvent::Stage => store.stage_placement(),
        RoomEvent::Commit => store.commit_placement(),
        RoomEvent::Cancel => store.cancel_drag(),
        RoomEvent::Delete => store.delete_dragged_item(),
        RoomEvent::LoadDraft { items } => {
            store.load_draft(items.clone());
            true
        }
    }
}

/// Apply a whole script in order. Returns how many events took effect.
pub fn replay<'a>(store: &mut PlacementStore, events: impl IntoIterator<Item = &'a RoomEvent>) -> usize {
    events
        .into_iter()
        .filter(|event| dispatch(store, event))
        .count()
}
