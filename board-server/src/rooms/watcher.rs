//! Live room collection watcher
//!
//! Holds a LIVE query on the room table (and a secondary one on the staff
//! directory for name resolution), re-derives every room's displayed
//! status on each change and republishes the full ordered list through a
//! watch channel. SSE handlers only ever read the channel; they never
//! touch the database.
//!
//! Per-room freshness: the cache always holds the most recently delivered
//! record per room. No ordering is guaranteed across different rooms.

use super::view::{FilterMode, RoomSummary, select_and_order};
use crate::core::ResourceVersions;
use crate::db::models::{Room, Staff};
use crate::db::repository::{RoomRepository, StaffRepository};
use crate::message::MessageBus;
use crate::utils::{AppError, AppResult};
use futures::StreamExt;
use shared::message::{BusMessage, NotificationLevel, SyncPayload};
use std::collections::HashMap;
use std::sync::Arc;
use surrealdb::engine::local::Db;
use surrealdb::{Action, Notification, Surreal};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct RoomWatcher {
    db: Surreal<Db>,
    bus: Arc<MessageBus>,
    versions: Arc<ResourceVersions>,
    rooms_tx: watch::Sender<Vec<RoomSummary>>,
}

impl RoomWatcher {
    pub fn new(
        db: Surreal<Db>,
        bus: Arc<MessageBus>,
        versions: Arc<ResourceVersions>,
        rooms_tx: watch::Sender<Vec<RoomSummary>>,
    ) -> Self {
        Self {
            db,
            bus,
            versions,
            rooms_tx,
        }
    }

    /// Run until the shutdown token fires or a live query stream ends.
    ///
    /// The initial snapshot is published before any notification is
    /// processed, so subscribers never observe an empty board on a
    /// populated database.
    pub async fn run(self, shutdown: CancellationToken) -> AppResult<()> {
        let room_repo = RoomRepository::new(self.db.clone());
        let staff_repo = StaffRepository::new(self.db.clone());

        // Live queries are registered before the snapshot is read: a write
        // landing in between is then delivered as a notification and folded
        // in as an idempotent upsert, instead of being lost.
        let mut room_stream = self
            .db
            .select::<Vec<Room>>("room")
            .live()
            .await
            .map_err(|e| AppError::database(format!("Live query failed: {}", e)))?;
        let mut staff_stream = self
            .db
            .select::<Vec<Staff>>("staff")
            .live()
            .await
            .map_err(|e| AppError::database(format!("Live query failed: {}", e)))?;

        let mut names = staff_names(&staff_repo).await?;
        let mut rooms: HashMap<String, Room> = room_repo
            .find_all()
            .await?
            .into_iter()
            .map(|r| (r.number(), r))
            .collect();

        self.publish(&rooms, &names);
        tracing::info!(count = rooms.len(), "Room watcher started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Room watcher shutting down");
                    break;
                }
                note = room_stream.next() => {
                    match note {
                        Some(Ok(notification)) => {
                            if let Some(number) = self.apply(&mut rooms, notification) {
                                self.publish(&rooms, &names);
                                self.broadcast_room(&rooms, &names, &number);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Room live query notification error");
                        }
                        None => {
                            tracing::warn!("Room live query stream ended");
                            let _ = self.bus.publish(BusMessage::notification(
                                NotificationLevel::Warning,
                                "Live room sync interrupted",
                            ));
                            break;
                        }
                    }
                }
                note = staff_stream.next() => {
                    match note {
                        Some(Ok(_)) => {
                            // Directory changes are rare; rebuild the whole
                            // name cache and re-resolve.
                            match staff_names(&staff_repo).await {
                                Ok(n) => {
                                    names = n;
                                    self.publish(&rooms, &names);
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "Failed to refresh staff names");
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Staff live query notification error");
                        }
                        None => {
                            tracing::warn!("Staff live query stream ended");
                            break;
                        }
                    }
                }
            }
        }

        // Dropping the streams kills the LIVE queries server-side.
        Ok(())
    }

    /// Fold a notification into the cache. Returns the room number when
    /// the cache changed.
    fn apply(
        &self,
        rooms: &mut HashMap<String, Room>,
        notification: Notification<Room>,
    ) -> Option<String> {
        let number = notification.data.number();
        if number.is_empty() {
            tracing::warn!("Room notification without record id, ignoring");
            return None;
        }

        match notification.action {
            Action::Create | Action::Update => {
                rooms.insert(number.clone(), notification.data);
                Some(number)
            }
            // Rooms are never deleted in normal operation; handle it
            // anyway so a manual cleanup does not leave a ghost entry.
            Action::Delete => {
                rooms.remove(&number);
                Some(number)
            }
            _ => None,
        }
    }

    /// Republish the full ordered list to watch subscribers.
    fn publish(&self, rooms: &HashMap<String, Room>, names: &HashMap<String, String>) {
        let summaries: Vec<RoomSummary> = rooms
            .values()
            .map(|r| RoomSummary::from_room(r, names))
            .collect();
        let ordered = select_and_order(&summaries, FilterMode::AllByNumber);
        self.rooms_tx.send_replace(ordered);
    }

    /// Broadcast a per-room sync message on the bus.
    fn broadcast_room(
        &self,
        rooms: &HashMap<String, Room>,
        names: &HashMap<String, String>,
        number: &str,
    ) {
        let data = rooms
            .get(number)
            .map(|r| RoomSummary::from_room(r, names))
            .and_then(|s| serde_json::to_value(s).ok());

        let payload = SyncPayload {
            resource: "room".to_string(),
            version: self.versions.increment("room"),
            action: "changed".to_string(),
            id: number.to_string(),
            data,
        };
        let _ = self.bus.publish(BusMessage::sync(&payload));
    }
}

/// Staff id -> display name, keyed by the record id string.
pub(crate) async fn staff_names(repo: &StaffRepository) -> AppResult<HashMap<String, String>> {
    let staff = repo.find_all().await?;
    Ok(staff
        .into_iter()
        .filter_map(|s| s.id.as_ref().map(|id| (id.to_string(), s.display_name.clone())))
        .collect())
}
