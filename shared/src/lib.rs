//! Shared types for the Roomboard edge server and its clients.
//!
//! - **models** (`models`): closed role set, room status enums, capability table
//! - **message** (`message`): bus message and sync payload types
//! - **client** (`client`): login request/response DTOs
//! - **util** (`util`): time helpers

pub mod client;
pub mod message;
pub mod models;
pub mod util;

pub use client::{LoginRequest, LoginResponse, UserInfo};
pub use message::{BusMessage, NotificationLevel, NotificationPayload, SyncPayload};
pub use models::{BaseStatus, BedConfiguration, DisplayStatus, Role, RoomAction};
