pub mod activity_log;
pub mod colors;
pub mod room;
pub mod ui;

pub use activity_log::{ActivityEntry, ActivityLog, ActivityLogWidget};
pub use room::{container_offset_for, image_size_for, to_screen, CellMap, RoomWidget};
pub use ui::{EmptyStateWidget, HelpOverlay, InventoryPanel, StatusBar};
