//! Message bus core
//!
//! # Message flow
//!
//! ```text
//! RoomWatcher ──▶ publish() ──▶ server_tx ──▶ subscribed clients (SSE)
//! ```
//!
//! Subscribers that lag past the channel capacity miss messages; clients
//! recover by re-reading the room snapshot, so delivery is best-effort.

use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::utils::AppError;

/// Message bus - routes server notifications to all subscribers.
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// Server-to-client broadcast channel
    server_tx: broadcast::Sender<BusMessage>,
    /// Shutdown signal token shared with background workers
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// Create a bus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Publish a message to all subscribers.
    ///
    /// Succeeds even when nobody is listening; a board with zero connected
    /// clients is a normal state.
    pub fn publish(&self, msg: BusMessage) -> Result<usize, AppError> {
        match self.server_tx.send(msg) {
            Ok(n) => Ok(n),
            Err(_) => Ok(0), // no active subscribers
        }
    }

    /// Subscribe to server broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// Shutdown token for background workers tied to this bus.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Signal all workers holding the shutdown token to stop.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{NotificationLevel, SyncPayload};

    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let bus = MessageBus::with_capacity(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let msg = BusMessage::Sync(SyncPayload {
            resource: "room".into(),
            version: 1,
            action: "changed".into(),
            id: "101".into(),
            data: None,
        });
        let delivered = bus.publish(msg.clone()).unwrap();
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.unwrap(), msg);
        assert_eq!(rx2.recv().await.unwrap(), msg);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = MessageBus::with_capacity(16);
        let msg = BusMessage::notification(NotificationLevel::Info, "hello");
        assert_eq!(bus.publish(msg).unwrap(), 0);
    }

    #[test]
    fn shutdown_cancels_token() {
        let bus = MessageBus::default();
        assert!(!bus.shutdown_token().is_cancelled());
        bus.shutdown();
        assert!(bus.shutdown_token().is_cancelled());
    }
}
