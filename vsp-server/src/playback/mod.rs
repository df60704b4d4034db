//! Playlist core: store, selector and the controller driving them

pub mod busy;
pub mod controller;
pub mod selector;
pub mod store;

pub use busy::BusyGuard;
pub use controller::{ControllerConfig, PlaylistController};
pub use selector::{Selector, SelectorState};
pub use store::{ApplyOutcome, PlaylistStore};
