mod observer;
mod store;

pub use observer::{PlacementObserver, StoreEvent, SubscriptionId};
pub use store::{PlacementStore, ZOOM_MAX, ZOOM_MIN};
