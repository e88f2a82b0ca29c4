mod cell;
pub mod generator;
mod room;
mod surface;

pub use cell::{CellId, GridCell};
pub use generator::{generate_surface_grid, GridLine, ImageSize, SurfaceGrid, ViewState, DEFAULT_DIVISIONS, MAX_DIVISIONS};
pub use room::{RoomGrid, RoomLayout};
pub use surface::{Surface, SurfaceCorners};
