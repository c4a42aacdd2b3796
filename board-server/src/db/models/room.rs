//! Room Model
//!
//! The central entity. `base_status` is the stored condition; `blocked`,
//! unresolved problems, and `recleaning_reason` are overlays that never
//! destroy it. The displayed status is derived, not stored (see
//! `rooms::status`), so overlay and base can never disagree.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{BaseStatus, BedConfiguration};
use surrealdb::RecordId;

/// Room entity. Created once at seeding, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// `room:<number>`; the record key is the room number string
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub base_status: BaseStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub blocked: bool,
    /// Base status captured when the room was blocked; restored on unblock
    #[serde(default)]
    pub blocked_restore: Option<BaseStatus>,
    /// Append-only; insertion order = report order
    #[serde(default)]
    pub problems: Vec<Problem>,
    /// Presence signals an active re-clean overlay
    #[serde(default)]
    pub recleaning_reason: Option<String>,
    /// URL reference to an uploaded evidence image
    #[serde(default)]
    pub recleaning_evidence: Option<String>,
    /// Staff id, set only on transition into clean
    #[serde(default)]
    pub last_cleaned_by: Option<String>,
    /// Epoch millis, set only on transition into clean
    #[serde(default)]
    pub last_cleaned_at: Option<i64>,
    /// Set by a supervisor mark-for-check action
    #[serde(default)]
    pub bed_configuration: Option<BedConfiguration>,
}

impl Room {
    /// Room number (record key without the table prefix).
    pub fn number(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string().trim_matches(['⟨', '⟩']).to_string())
            .unwrap_or_default()
    }

    pub fn has_unresolved_problems(&self) -> bool {
        self.problems.iter().any(|p| !p.is_resolved)
    }

    pub fn unresolved_problem_count(&self) -> usize {
        self.problems.iter().filter(|p| !p.is_resolved).count()
    }
}

/// A reported defect. Records are never removed; resolving only flips
/// `is_resolved` (audit trail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique within the room (uuid v4)
    pub id: String,
    pub description: String,
    /// Staff id of the reporter
    pub reported_by: String,
    /// Epoch millis, immutable
    pub reported_at: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_resolved: bool,
    /// URL reference to an uploaded evidence image
    #[serde(default)]
    pub evidence: Option<String>,
}

/// Seed payload for initial room provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub base_status: BaseStatus,
    #[serde(default)]
    pub problems: Vec<Problem>,
}
