//! Filter & Sort Engine
//!
//! Builds the API-facing [`RoomSummary`] projection and applies the
//! role-specific filter modes. Filtering evaluates the derived status,
//! never raw fields, so a blocked room disappears from every plain status
//! filter except `blocked_only` regardless of what is beneath the block.

use super::status::derive_display_status;
use crate::db::models::{Problem, Room};
use serde::{Deserialize, Serialize};
use shared::models::{BaseStatus, BedConfiguration, DisplayStatus, Role};
use std::collections::HashMap;

/// View filter, defaulted per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    AllByStatus,
    #[default]
    AllByNumber,
    DirtyOnly,
    CleanOnly,
    OccupiedOnly,
    BlockedOnly,
    ProblemOnly,
}

impl FilterMode {
    /// The view each role lands on: maintenance sees its work queue,
    /// cleaners see what needs cleaning, supervisors see everything.
    pub fn default_for_role(role: Role) -> Self {
        match role {
            Role::Maintenance => Self::ProblemOnly,
            Role::Cleaner => Self::DirtyOnly,
            Role::Supervisor => Self::AllByNumber,
        }
    }

    fn matches(&self, status: DisplayStatus) -> bool {
        match self {
            Self::AllByStatus | Self::AllByNumber => true,
            // Functional meaning of "dirty" includes rooms sent back
            // for a re-clean.
            Self::DirtyOnly => status.needs_cleaning(),
            Self::CleanOnly => status == DisplayStatus::Clean,
            Self::OccupiedOnly => status == DisplayStatus::Occupied,
            Self::BlockedOnly => matches!(status, DisplayStatus::Blocked { .. }),
            Self::ProblemOnly => matches!(status, DisplayStatus::Problem { .. }),
        }
    }
}

/// Problem projection with the reporter's id resolved to a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemView {
    pub id: String,
    pub description: String,
    pub reported_by: String,
    pub reported_at: i64,
    pub is_resolved: bool,
    pub evidence: Option<String>,
}

impl ProblemView {
    fn from_problem(problem: &Problem, names: &HashMap<String, String>) -> Self {
        Self {
            id: problem.id.clone(),
            description: problem.description.clone(),
            reported_by: resolve_name(&problem.reported_by, names),
            reported_at: problem.reported_at,
            is_resolved: problem.is_resolved,
            evidence: problem.evidence.clone(),
        }
    }
}

/// What the board renders per room: the derived status plus everything a
/// client needs without a second request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room number, e.g. "101"
    pub id: String,
    pub display_status: DisplayStatus,
    pub base_status: BaseStatus,
    pub blocked: bool,
    pub unresolved_problems: usize,
    pub problems: Vec<ProblemView>,
    pub recleaning_reason: Option<String>,
    pub recleaning_evidence: Option<String>,
    pub bed_configuration: Option<BedConfiguration>,
    /// Display name, resolved from the staff directory
    pub last_cleaned_by: Option<String>,
    pub last_cleaned_at: Option<i64>,
}

impl RoomSummary {
    /// Project a room for the API, resolving staff ids through `names`.
    /// Unknown ids pass through unchanged (directory is eventually
    /// consistent).
    pub fn from_room(room: &Room, names: &HashMap<String, String>) -> Self {
        Self {
            id: room.number(),
            display_status: derive_display_status(room),
            base_status: room.base_status,
            blocked: room.blocked,
            unresolved_problems: room.unresolved_problem_count(),
            problems: room
                .problems
                .iter()
                .map(|p| ProblemView::from_problem(p, names))
                .collect(),
            recleaning_reason: room.recleaning_reason.clone(),
            recleaning_evidence: room.recleaning_evidence.clone(),
            bed_configuration: room.bed_configuration,
            last_cleaned_by: room
                .last_cleaned_by
                .as_ref()
                .map(|id| resolve_name(id, names)),
            last_cleaned_at: room.last_cleaned_at,
        }
    }
}

fn resolve_name(staff_id: &str, names: &HashMap<String, String>) -> String {
    names
        .get(staff_id)
        .cloned()
        .unwrap_or_else(|| staff_id.to_string())
}

/// Room ids are usually numeric ("101"); sort those numerically and fall
/// back to lexicographic for anything else, numbers first.
fn id_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Apply a filter mode and the deterministic ordering.
///
/// All modes sort by room id; `AllByStatus` additionally puts rooms that
/// need cleaning first, preserving id order within each group.
pub fn select_and_order(rooms: &[RoomSummary], mode: FilterMode) -> Vec<RoomSummary> {
    let mut selected: Vec<RoomSummary> = rooms
        .iter()
        .filter(|r| mode.matches(r.display_status))
        .cloned()
        .collect();

    selected.sort_by(|a, b| id_order(&a.id, &b.id));
    if mode == FilterMode::AllByStatus {
        // Stable: id order survives within each group.
        selected.sort_by_key(|r| !r.display_status.needs_cleaning());
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, status: DisplayStatus) -> RoomSummary {
        RoomSummary {
            id: id.to_string(),
            display_status: status,
            base_status: match status {
                DisplayStatus::Clean => BaseStatus::Clean,
                DisplayStatus::Occupied => BaseStatus::Occupied,
                _ => BaseStatus::Dirty,
            },
            blocked: matches!(status, DisplayStatus::Blocked { .. }),
            unresolved_problems: 0,
            problems: Vec::new(),
            recleaning_reason: None,
            recleaning_evidence: None,
            bed_configuration: None,
            last_cleaned_by: None,
            last_cleaned_at: None,
        }
    }

    #[test]
    fn dirty_only_excludes_blocked_even_when_dirty_beneath() {
        let rooms = vec![
            summary("101", DisplayStatus::Dirty),
            summary("102", DisplayStatus::Clean),
            summary(
                "103",
                DisplayStatus::Blocked {
                    base: BaseStatus::Dirty,
                },
            ),
        ];
        let out = select_and_order(&rooms, FilterMode::DirtyOnly);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "101");
    }

    #[test]
    fn dirty_only_includes_reclean_rooms() {
        let rooms = vec![
            summary("201", DisplayStatus::Reclean { occupied: false }),
            summary("202", DisplayStatus::Reclean { occupied: true }),
            summary("203", DisplayStatus::Occupied),
        ];
        let out = select_and_order(&rooms, FilterMode::DirtyOnly);
        let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["201", "202"]);
    }

    #[test]
    fn blocked_only_is_the_single_filter_showing_blocked() {
        let rooms = vec![summary(
            "301",
            DisplayStatus::Blocked {
                base: BaseStatus::Clean,
            },
        )];
        assert!(select_and_order(&rooms, FilterMode::CleanOnly).is_empty());
        assert!(select_and_order(&rooms, FilterMode::ProblemOnly).is_empty());
        assert_eq!(select_and_order(&rooms, FilterMode::BlockedOnly).len(), 1);
    }

    #[test]
    fn all_by_number_sorts_numerically() {
        let rooms = vec![
            summary("110", DisplayStatus::Clean),
            summary("9", DisplayStatus::Dirty),
            summary("21", DisplayStatus::Occupied),
        ];
        let ids: Vec<_> = select_and_order(&rooms, FilterMode::AllByNumber)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["9", "21", "110"]);
    }

    #[test]
    fn all_by_status_puts_rooms_needing_cleaning_first() {
        let rooms = vec![
            summary("101", DisplayStatus::Clean),
            summary("102", DisplayStatus::Dirty),
            summary("103", DisplayStatus::Occupied),
            summary("104", DisplayStatus::Reclean { occupied: true }),
            summary("105", DisplayStatus::Dirty),
        ];
        let ids: Vec<_> = select_and_order(&rooms, FilterMode::AllByStatus)
            .into_iter()
            .map(|r| r.id)
            .collect();
        // Needs-cleaning first in id order, then the rest in id order.
        assert_eq!(ids, ["102", "104", "105", "101", "103"]);
    }

    #[test]
    fn default_filter_per_role() {
        assert_eq!(
            FilterMode::default_for_role(Role::Maintenance),
            FilterMode::ProblemOnly
        );
        assert_eq!(
            FilterMode::default_for_role(Role::Cleaner),
            FilterMode::DirtyOnly
        );
        assert_eq!(
            FilterMode::default_for_role(Role::Supervisor),
            FilterMode::AllByNumber
        );
    }

    #[test]
    fn summary_resolves_staff_names_with_passthrough() {
        let mut room = Room {
            id: None,
            base_status: BaseStatus::Clean,
            blocked: false,
            blocked_restore: None,
            problems: Vec::new(),
            recleaning_reason: None,
            recleaning_evidence: None,
            last_cleaned_by: Some("staff:maria".into()),
            last_cleaned_at: Some(1_700_000_000_000),
            bed_configuration: None,
        };
        room.problems.push(Problem {
            id: "p1".into(),
            description: "lamp".into(),
            reported_by: "staff:gone".into(),
            reported_at: 1,
            is_resolved: true,
            evidence: None,
        });

        let mut names = HashMap::new();
        names.insert("staff:maria".to_string(), "Maria".to_string());

        let s = RoomSummary::from_room(&room, &names);
        assert_eq!(s.last_cleaned_by.as_deref(), Some("Maria"));
        // Unknown reporter id passes through unchanged.
        assert_eq!(s.problems[0].reported_by, "staff:gone");
        assert_eq!(s.display_status, DisplayStatus::Clean);
    }
}
