//! Grid-based item placement for a room scene.
//!
//! Surfaces of a room photo are subdivided into cell grids; items snap to
//! cells through a drag session that previews, stages and commits placements
//! against the current draft.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod placement;
pub mod state;
