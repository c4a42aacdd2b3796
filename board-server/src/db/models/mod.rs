//! Database Models

// Serde helpers
pub mod serde_helpers;

// Rooms
pub mod room;

// Staff directory
pub mod staff;

// Re-exports
pub use room::{Problem, Room, RoomCreate};
pub use staff::{Staff, StaffCreate};
