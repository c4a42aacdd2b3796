//! Room lifecycle core
//!
//! - [`status`]: pure derivation of the displayed status from stored fields
//! - [`transitions`]: role-gated state transitions producing minimal patches
//! - [`view`]: filtering and ordering of derived room summaries per role
//! - [`watcher`]: live collection subscription republishing derived state

pub mod status;
pub mod transitions;
pub mod view;
pub mod watcher;

pub use status::derive_display_status;
pub use transitions::{Actor, RoomPatch, TransitionError};
pub use view::{FilterMode, ProblemView, RoomSummary, select_and_order};
pub use watcher::RoomWatcher;
