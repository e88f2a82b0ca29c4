//! Placement rules: footprints, occupancy, validation, ghost preview and
//! the drag session types the store drives.

mod footprint;
mod ghost;
mod item;
mod occupancy;
mod session;
mod validator;

pub use footprint::{footprint, shape_fits, shape_span, translate_shape, FootprintShape, MAX_FOOTPRINT_CELLS};
pub use ghost::{find_first_fit, ghost_at, ghost_for_pointer, nearest_cell, Ghost};
pub use item::{CatalogItem, ItemId, PlacedId, PlacedItem, Rotation};
pub use occupancy::{occupied_cells, OccupancyCache};
pub use session::{DragConstraints, DragSession, EndReason, PendingPlacement, PointerClaim, SessionPhase};
pub use validator::{PlacementValidator, Rejection, Verdict};
