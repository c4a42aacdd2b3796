//! Bus message types
//!
//! Messages published by the server to connected clients. The transport is
//! in-process (broadcast channel fanned out over SSE); the payload shapes
//! are stable so external clients can deserialize them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Resource change notification broadcast after every accepted write.
///
/// `version` increments per resource so clients can discard stale
/// out-of-order deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "room", "staff")
    pub resource: String,
    /// Monotonic per-resource version
    pub version: u64,
    /// Change type ("changed", "seeded", ...)
    pub action: String,
    /// Resource id
    pub id: String,
    /// Resource data, if any
    pub data: Option<serde_json::Value>,
}

/// Free-form server notification (watcher restarts, degraded sync, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub level: NotificationLevel,
    pub message: String,
}

/// Message envelope on the server broadcast bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BusMessage {
    Sync(SyncPayload),
    Notification(NotificationPayload),
}

impl BusMessage {
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::Sync(payload.clone())
    }

    pub fn notification(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self::Notification(NotificationPayload {
            level,
            message: message.into(),
        })
    }
}
