//! Domain Models

pub mod role;
pub mod status;

pub use role::{ParseRoleError, Role, RoomAction};
pub use status::{BaseStatus, BedConfiguration, DisplayStatus};
