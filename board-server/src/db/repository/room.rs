//! Room Repository
//!
//! Writes go through [`RoomRepository::apply_patch`], which emits an
//! UPDATE statement carrying only the fields a transition touched. The
//! store resolves concurrent writers field-by-field (last write wins), so
//! the smaller the patch, the smaller the blast radius of a lost update.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Room, RoomCreate};
use crate::rooms::transitions::RoomPatch;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "room";

#[derive(Clone)]
pub struct RoomRepository {
    base: BaseRepository,
}

impl RoomRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all rooms, ordered by record id.
    pub async fn find_all(&self) -> RepoResult<Vec<Room>> {
        let rooms: Vec<Room> = self
            .base
            .db()
            .query("SELECT * FROM room ORDER BY id")
            .await?
            .take(0)?;
        Ok(rooms)
    }

    /// Find a room by its number (record key).
    pub async fn find_by_number(&self, number: &str) -> RepoResult<Option<Room>> {
        let thing = RecordId::from_table_key(TABLE, number);
        let room: Option<Room> = self.base.db().select(thing).await?;
        Ok(room)
    }

    /// Create a room with a fixed number. Used by seeding only; rooms are
    /// never created through the API.
    pub async fn create(&self, number: &str, data: RoomCreate) -> RepoResult<Room> {
        let thing = RecordId::from_table_key(TABLE, number);
        let room = Room {
            id: None,
            base_status: data.base_status,
            blocked: false,
            blocked_restore: None,
            problems: data.problems,
            recleaning_reason: None,
            recleaning_evidence: None,
            last_cleaned_by: None,
            last_cleaned_at: None,
            bed_configuration: None,
        };

        let created: Option<Room> = self.base.db().create(thing).content(room).await?;
        created.ok_or_else(|| RepoError::Database(format!("Failed to create room {}", number)))
    }

    /// Apply a minimal field patch to a room and return the updated record.
    ///
    /// Only fields present in the patch appear in the UPDATE statement.
    pub async fn apply_patch(&self, number: &str, patch: RoomPatch) -> RepoResult<Room> {
        if patch.is_empty() {
            return self
                .find_by_number(number)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", number)));
        }

        let thing = RecordId::from_table_key(TABLE, number);

        let mut sets: Vec<&str> = Vec::new();
        if patch.base_status.is_some() {
            sets.push("base_status = $base_status");
        }
        if patch.blocked.is_some() {
            sets.push("blocked = $blocked");
        }
        if patch.blocked_restore.is_some() {
            sets.push("blocked_restore = $blocked_restore");
        }
        if patch.problems.is_some() {
            sets.push("problems = $problems");
        }
        if patch.recleaning_reason.is_some() {
            sets.push("recleaning_reason = $recleaning_reason");
        }
        if patch.recleaning_evidence.is_some() {
            sets.push("recleaning_evidence = $recleaning_evidence");
        }
        if patch.last_cleaned_by.is_some() {
            sets.push("last_cleaned_by = $last_cleaned_by");
        }
        if patch.last_cleaned_at.is_some() {
            sets.push("last_cleaned_at = $last_cleaned_at");
        }
        if patch.bed_configuration.is_some() {
            sets.push("bed_configuration = $bed_configuration");
        }

        let stmt = format!("UPDATE $thing SET {}", sets.join(", "));
        let mut query = self.base.db().query(stmt).bind(("thing", thing));

        if let Some(v) = patch.base_status {
            query = query.bind(("base_status", v));
        }
        if let Some(v) = patch.blocked {
            query = query.bind(("blocked", v));
        }
        if let Some(v) = patch.blocked_restore {
            query = query.bind(("blocked_restore", v));
        }
        if let Some(v) = patch.problems {
            query = query.bind(("problems", v));
        }
        if let Some(v) = patch.recleaning_reason {
            query = query.bind(("recleaning_reason", v));
        }
        if let Some(v) = patch.recleaning_evidence {
            query = query.bind(("recleaning_evidence", v));
        }
        if let Some(v) = patch.last_cleaned_by {
            query = query.bind(("last_cleaned_by", v));
        }
        if let Some(v) = patch.last_cleaned_at {
            query = query.bind(("last_cleaned_at", v));
        }
        if let Some(v) = patch.bed_configuration {
            query = query.bind(("bed_configuration", v));
        }

        let mut result = query.await?;
        let rooms: Vec<Room> = result.take(0)?;
        rooms
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Room {} not found", number)))
    }
}
