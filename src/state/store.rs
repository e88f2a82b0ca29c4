use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::geometry::Point;
use crate::grid::{CellId, ImageSize, RoomGrid, RoomLayout, ViewState};
use crate::placement::{
    find_first_fit, ghost_at, nearest_cell, CatalogItem, DragConstraints, DragSession, EndReason,
    Ghost, ItemId, OccupancyCache, PendingPlacement, PlacedItem, PointerClaim, SessionPhase,
};

use super::observer::{PlacementObserver, StoreEvent, SubscriptionId};

/// Zoom limits for the room view
pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 3.0;

/// The single owner of placement state: draft items, the drag session, the
/// pending placement and the grid they are validated against.
///
/// Every mutation goes through a transition method. Each one either applies
/// fully or changes nothing, and reports failure as `false` rather than an
/// error. Observers hear about changes after the transition completes.
pub struct PlacementStore {
    layout: RoomLayout,
    view: ViewState,
    image: ImageSize,
    grid: Option<RoomGrid>,
    grid_version: u64,

    catalog: HashMap<ItemId, CatalogItem>,

    draft: Vec<PlacedItem>,
    draft_version: u64,
    occupancy: OccupancyCache,

    session: Option<DragSession>,
    pending: Option<PendingPlacement>,
    ghost: Option<Ghost>,

    /// Counter behind generated `placed-{n}` ids
    next_placed_seq: u64,

    observers: Vec<(SubscriptionId, Box<dyn PlacementObserver>)>,
    next_subscription: u64,
    queued: Vec<StoreEvent>,
}

impl PlacementStore {
    pub fn new(layout: RoomLayout) -> Self {
        Self {
            layout,
            view: ViewState::default(),
            image: ImageSize::default(),
            grid: None,
            grid_version: 0,
            catalog: HashMap::new(),
            draft: Vec::new(),
            draft_version: 0,
            occupancy: OccupancyCache::new(),
            session: None,
            pending: None,
            ghost: None,
            next_placed_seq: 0,
            observers: Vec::new(),
            next_subscription: 0,
            queued: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read access for the rendering layer
    // ------------------------------------------------------------------

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn image_size(&self) -> &ImageSize {
        &self.image
    }

    /// `None` until the image has been measured
    pub fn grid(&self) -> Option<&RoomGrid> {
        self.grid.as_ref()
    }

    pub fn grid_version(&self) -> u64 {
        self.grid_version
    }

    pub fn draft_items(&self) -> &[PlacedItem] {
        &self.draft
    }

    pub fn draft_item(&self, placed_id: &str) -> Option<&PlacedItem> {
        self.draft.iter().find(|item| item.id == placed_id)
    }

    pub fn draft_version(&self) -> u64 {
        self.draft_version
    }

    /// Cells held by draft items, minus the one being moved
    pub fn occupancy(&self) -> &HashSet<CellId> {
        self.occupancy.cells()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map_or(SessionPhase::Idle, |session| session.phase)
    }

    pub fn ghost(&self) -> Option<&Ghost> {
        self.ghost.as_ref()
    }

    pub fn pending_placement(&self) -> Option<&PendingPlacement> {
        self.pending.as_ref()
    }

    /// Whether the owning pointer is actively dragging (for drag-follow visuals)
    pub fn is_pointer_dragging(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.pointer.dragging)
    }

    pub fn catalog_item(&self, item_id: &str) -> Option<&CatalogItem> {
        self.catalog.get(item_id)
    }

    /// Which draft item covers a cell
    pub fn item_at(&self, cell: &CellId) -> Option<&PlacedItem> {
        self.draft.iter().find(|item| item.occupies(cell))
    }

    /// Draft items as JSON, for whatever saves the room
    pub fn draft_snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.draft)
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl PlacementObserver + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    // ------------------------------------------------------------------
    // Grid inputs
    // ------------------------------------------------------------------

    pub fn set_layout(&mut self, layout: RoomLayout) {
        if layout == self.layout {
            return;
        }
        self.layout = layout;
        self.regenerate_grid();
    }

    pub fn set_view(&mut self, view: ViewState) {
        if view == self.view {
            return;
        }
        self.view = view;
        self.regenerate_grid();
    }

    pub fn set_image_size(&mut self, image: ImageSize) {
        if image == self.image {
            return;
        }
        self.image = image;
        self.regenerate_grid();
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let mut view = self.view;
        view.pan = view.pan.offset(dx, dy);
        self.set_view(view);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        let mut view = self.view;
        view.zoom = (view.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.set_view(view);
    }

    fn regenerate_grid(&mut self) {
        self.grid = RoomGrid::generate(&self.layout, &self.image, &self.view);
        self.grid_version += 1;
        debug!(
            version = self.grid_version,
            cells = self.grid.as_ref().map_or(0, RoomGrid::len),
            "grid regenerated"
        );
        self.queued.push(StoreEvent::GridChanged {
            version: self.grid_version,
        });
        self.refresh_ghost();
        self.flush();
    }

    // ------------------------------------------------------------------
    // Draft and catalog
    // ------------------------------------------------------------------

    pub fn set_catalog(&mut self, items: impl IntoIterator<Item = CatalogItem>) {
        self.catalog = items
            .into_iter()
            .map(|item| (item.item_id.clone(), item))
            .collect();
    }

    /// Replace the draft with a saved room. Any active session is dropped.
    ///
    /// An item is skipped when its id repeats, when its footprint disagrees
    /// with its dimensions (see [`PlacedItem::has_consistent_footprint`]), when
    /// a cell is not on this layout's grid, or when a cell is already claimed
    /// by an earlier item. Returns how many were kept.
    pub fn load_draft(&mut self, items: Vec<PlacedItem>) -> usize {
        if let Some(session) = self.session.take() {
            debug!(placed_id = %session.placed_id, "loading draft drops the active session");
            self.queued.push(StoreEvent::SessionEnded {
                placed_id: session.placed_id,
                reason: EndReason::Cancelled,
            });
        }
        self.pending = None;

        let mut taken: HashSet<CellId> = HashSet::new();
        let mut ids: HashSet<String> = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let conflict = ids.contains(&item.id)
                || !item.has_consistent_footprint()
                || item
                    .footprint_cell_ids
                    .iter()
                    .any(|cell| !self.layout.contains(cell) || taken.contains(cell));
            if conflict {
                warn!(placed_id = %item.id, "skipping draft item that overlaps or is malformed");
                continue;
            }
            taken.extend(item.footprint_cell_ids.iter().copied());
            ids.insert(item.id.clone());
            kept.push(item);
        }

        let count = kept.len();
        self.draft = kept;
        self.mark_draft_changed();
        self.refresh_ghost();
        self.flush();
        count
    }

    // ------------------------------------------------------------------
    // Drag session transitions
    // ------------------------------------------------------------------

    /// Idle -> Dragging with a new item. Rejected while another session is active.
    pub fn start_drag_from_inventory(&mut self, item_id: impl Into<ItemId>, constraints: DragConstraints) -> bool {
        let item_id = item_id.into();
        if let Some(active) = &self.session {
            warn!(
                active = %active.placed_id,
                requested = %item_id,
                "drag start rejected: a session is already active"
            );
            return false;
        }
        if !constraints.is_well_formed() {
            warn!(
                item_id = %item_id,
                x_length = constraints.x_length,
                y_length = constraints.y_length,
                "drag start rejected: malformed item shape"
            );
            return false;
        }

        let placed_id = self.generate_placed_id();
        debug!(item_id = %item_id, placed_id = %placed_id, "drag started from inventory");
        self.queued.push(StoreEvent::SessionStarted {
            item_id: item_id.clone(),
            placed_id: placed_id.clone(),
            replacement: false,
        });
        self.session = Some(DragSession::from_inventory(item_id, placed_id, constraints));
        self.pending = None;
        self.refresh_occupancy();
        self.refresh_ghost();
        self.flush();
        true
    }

    /// Start an inventory drag with the catalog's defaults for the item
    pub fn start_drag_from_catalog(&mut self, item_id: &str) -> bool {
        let Some(item) = self.catalog.get(item_id) else {
            debug!(item_id, "drag start ignored: not in catalog");
            return false;
        };
        let constraints = DragConstraints::for_item(item);
        self.start_drag_from_inventory(item_id, constraints)
    }

    /// Idle -> Dragging with an existing item. The item leaves the draft
    /// immediately so it stops blocking its own cells; it is held for rollback.
    pub fn start_drag_from_placed(&mut self, placed_id: &str) -> bool {
        if let Some(active) = &self.session {
            warn!(
                active = %active.placed_id,
                requested = placed_id,
                "drag start rejected: a session is already active"
            );
            return false;
        }
        let Some(index) = self.draft.iter().position(|item| item.id == placed_id) else {
            debug!(placed_id, "drag start ignored: no such placed item");
            return false;
        };

        let item = self.draft.remove(index);
        let allowed_surface = self
            .catalog
            .get(&item.item_id)
            .and_then(|entry| entry.allowed_surface);
        debug!(placed_id, item_id = %item.item_id, "drag started from placed item");
        self.queued.push(StoreEvent::SessionStarted {
            item_id: item.item_id.clone(),
            placed_id: item.id.clone(),
            replacement: true,
        });
        self.session = Some(DragSession::from_placed(item, index, allowed_surface));
        self.pending = None;
        self.mark_draft_changed();
        self.refresh_ghost();
        self.flush();
        true
    }

    /// Move the ghost to the cell nearest the pointer (screen space).
    pub fn update_hover(&mut self, pointer: Point) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(grid) = self.grid.as_ref() else {
            return false;
        };
        let Some(cell) = nearest_cell(grid, &pointer, session.allowed_surface) else {
            return false;
        };
        let anchor = cell.id;
        self.hover_cell(anchor)
    }

    /// Move the ghost to a known cell
    pub fn hover_cell(&mut self, anchor: CellId) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.hover_cell_id == Some(anchor) && session.phase == SessionPhase::Dragging {
            return true;
        }
        session.hover_cell_id = Some(anchor);
        if session.phase == SessionPhase::Staged {
            debug!(placed_id = %session.placed_id, "hover moved; staged placement withdrawn");
            session.phase = SessionPhase::Dragging;
            self.pending = None;
        }
        self.refresh_ghost();
        self.flush();
        true
    }

    /// A pointer pressed. The first pointer to press owns the session.
    pub fn pointer_down(&mut self, pointer_id: u64, position: Point) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session
            .pointer
            .pointer_id
            .is_some_and(|owner| owner != pointer_id)
        {
            return false;
        }
        session.pointer = PointerClaim {
            pointer_id: Some(pointer_id),
            dragging: true,
        };
        self.update_hover(position)
    }

    /// Pointer moves from anyone but the owning pointer are ignored.
    pub fn pointer_move(&mut self, pointer_id: u64, position: Point) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session
            .pointer
            .pointer_id
            .is_some_and(|owner| owner != pointer_id)
        {
            return false;
        }
        if session.pointer.pointer_id.is_some() {
            session.pointer.dragging = true;
        }
        self.update_hover(position)
    }

    /// Release the owning pointer. The session itself stays alive.
    pub fn pointer_up(&mut self, pointer_id: u64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.pointer.pointer_id != Some(pointer_id) {
            return false;
        }
        session.pointer = PointerClaim::default();
        true
    }

    /// The pointer left the interactive area: stop drag-follow, keep the session
    pub fn pointer_leave(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pointer.dragging = false;
        }
    }

    /// Turn the dragged item a quarter turn. Not available for explicit shapes.
    pub fn rotate_dragged_item(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.shape.explicit.is_some() {
            debug!(placed_id = %session.placed_id, "rotation ignored for explicit footprint");
            return false;
        }
        session.shape.rotation = session.shape.rotation.next();
        if session.phase == SessionPhase::Staged {
            session.phase = SessionPhase::Dragging;
            self.pending = None;
        }
        self.refresh_ghost();
        self.flush();
        true
    }

    /// Dragging -> Staged when the ghost is valid. No change otherwise.
    pub fn stage_placement(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("stage ignored: no active session");
            return false;
        };
        let Some(ghost) = self.ghost.as_ref() else {
            debug!(placed_id = %session.placed_id, "stage ignored: no ghost yet");
            return false;
        };
        if !ghost.is_valid {
            debug!(
                placed_id = %session.placed_id,
                anchor = %ghost.anchor_cell_id,
                reason = ?ghost.rejection,
                "stage rejected: ghost invalid"
            );
            return false;
        }

        let pending = session.materialize(ghost);
        session.phase = SessionPhase::Staged;
        debug!(placed_id = %pending.item.id, anchor = %pending.item.anchor_cell_id, "placement staged");
        self.queued.push(StoreEvent::Staged {
            placed_id: pending.item.id.clone(),
        });
        self.pending = Some(pending);
        self.flush();
        true
    }

    /// Merge the staged placement into the draft and end the session.
    ///
    /// Preview sessions end here too but merge nothing and return false.
    pub fn commit_placement(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            debug!("commit ignored: nothing staged");
            return false;
        };
        let Some(session) = self.session.take() else {
            return false;
        };
        self.clear_ghost();

        if pending.preview {
            debug!(placed_id = %pending.item.id, "preview confirmed; draft untouched");
            self.queued.push(StoreEvent::SessionEnded {
                placed_id: session.placed_id,
                reason: EndReason::Previewed,
            });
            self.refresh_occupancy();
            self.flush();
            return false;
        }

        let placed_id = pending.item.id.clone();
        self.draft.retain(|item| item.id != placed_id);
        let index = session
            .original_index
            .unwrap_or(self.draft.len())
            .min(self.draft.len());
        self.draft.insert(index, pending.item);
        debug!(placed_id = %placed_id, "placement committed");
        self.mark_draft_changed();
        self.queued.push(StoreEvent::SessionEnded {
            placed_id,
            reason: EndReason::Committed,
        });
        self.flush();
        true
    }

    /// Abort the drag. A re-placed item goes back exactly as it was.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            debug!("cancel ignored: no active session");
            return false;
        };
        self.pending = None;
        self.clear_ghost();

        if let Some(original) = session.original_item {
            let index = session
                .original_index
                .unwrap_or(self.draft.len())
                .min(self.draft.len());
            self.draft.insert(index, original);
            self.mark_draft_changed();
        } else {
            self.refresh_occupancy();
        }
        debug!(placed_id = %session.placed_id, "drag cancelled");
        self.queued.push(StoreEvent::SessionEnded {
            placed_id: session.placed_id,
            reason: EndReason::Cancelled,
        });
        self.flush();
        true
    }

    /// Same as [`cancel_drag`](Self::cancel_drag): the staged placement and the
    /// session go together, and a re-placed item is restored.
    pub fn cancel_pending_placement(&mut self) -> bool {
        self.cancel_drag()
    }

    /// End the session without restoring the original: the item is gone.
    pub fn delete_dragged_item(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            debug!("delete ignored: no active session");
            return false;
        };
        self.pending = None;
        self.clear_ghost();
        self.refresh_occupancy();
        debug!(placed_id = %session.placed_id, "dragged item deleted");
        self.queued.push(StoreEvent::SessionEnded {
            placed_id: session.placed_id,
            reason: EndReason::Deleted,
        });
        self.flush();
        true
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn generate_placed_id(&mut self) -> String {
        loop {
            self.next_placed_seq += 1;
            let id = format!("placed-{}", self.next_placed_seq);
            if !self.draft.iter().any(|item| item.id == id) {
                return id;
            }
        }
    }

    fn mark_draft_changed(&mut self) {
        self.draft_version += 1;
        self.refresh_occupancy();
        self.queued.push(StoreEvent::DraftChanged {
            version: self.draft_version,
            items: self.draft.len(),
        });
    }

    fn refresh_occupancy(&mut self) {
        let exclude = self
            .session
            .as_ref()
            .and_then(|session| session.origin_placed_id.as_deref());
        self.occupancy.refresh(self.draft_version, &self.draft, exclude);
    }

    fn clear_ghost(&mut self) {
        if self.ghost.take().is_some() {
            self.queued.push(StoreEvent::GhostChanged { valid: None });
        }
    }

    /// Recompute the ghost from the session's hover cell, running
    /// auto-placement first for inventory drags that have no hover cell yet.
    fn refresh_ghost(&mut self) {
        let (Some(session), Some(grid)) = (self.session.as_mut(), self.grid.as_ref()) else {
            self.clear_ghost();
            return;
        };
        let occupied = self.occupancy.cells();

        if session.needs_auto_placement() {
            match find_first_fit(grid, &session.shape, session.allowed_surface, occupied) {
                Some(anchor) => {
                    debug!(placed_id = %session.placed_id, anchor = %anchor, "auto-placed");
                    session.hover_cell_id = Some(anchor);
                }
                None if !session.placement_failure_reported => {
                    session.placement_failure_reported = true;
                    info!(item_id = %session.item_id, "no free spot for item");
                    self.queued.push(StoreEvent::PlacementFailed {
                        item_id: session.item_id.clone(),
                    });
                }
                None => {}
            }
        }

        let next = session
            .hover_cell_id
            .map(|anchor| ghost_at(grid, anchor, &session.shape, session.allowed_surface, occupied));

        // A staged placement must keep matching a valid ghost
        if let Some(pending) = &self.pending {
            let still_matches = next.as_ref().is_some_and(|ghost| {
                ghost.is_valid
                    && ghost.anchor_cell_id == pending.item.anchor_cell_id
                    && ghost.footprint_cell_ids == pending.item.footprint_cell_ids
            });
            if !still_matches {
                debug!(placed_id = %session.placed_id, "staged placement no longer fits");
                session.phase = SessionPhase::Dragging;
                self.pending = None;
            }
        }

        if next != self.ghost {
            self.queued.push(StoreEvent::GhostChanged {
                valid: next.as_ref().map(|ghost| ghost.is_valid),
            });
            self.ghost = next;
        }
    }

    fn flush(&mut self) {
        if self.queued.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.queued);
        let mut observers = std::mem::take(&mut self.observers);
        for event in &events {
            for (_, observer) in observers.iter_mut() {
                observer.on_event(event, self);
            }
        }
        self.observers = observers;
    }
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new(RoomLayout::default())
    }
}
