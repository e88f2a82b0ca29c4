//! Gesture protocol: JSON-lines events that drive a [`PlacementStore`](crate::state::PlacementStore).

mod dispatch;
mod queue;
mod types;
mod watcher;

pub use dispatch::{dispatch, replay};
pub use queue::{create_event_queue, EventReceiver, EventSender};
pub use types::RoomEvent;
pub use watcher::{parse_line, read_complete_events, read_events, FileWatcher};
