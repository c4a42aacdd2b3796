//! Message bus - server-to-client change notifications

mod bus;

pub use bus::MessageBus;
pub use shared::message::{BusMessage, NotificationLevel, SyncPayload};
