//! Transition Authority
//!
//! One pure function per user-facing action. Each validates the actor's
//! role against the capability table and the arguments against the room,
//! then returns the next room value together with a [`RoomPatch`] naming
//! only the fields that changed. Persistence and broadcasting happen in
//! the handlers; nothing here suspends or performs I/O.
//!
//! Failure policy: permission and validation problems are rejected before
//! any write is attempted, and a rejected action is always observable to
//! the caller as an error, never a silent no-op.

use crate::db::models::{Problem, Room};
use shared::models::{BaseStatus, BedConfiguration, Role, RoomAction};
use shared::util::now_millis;
use thiserror::Error;
use uuid::Uuid;

/// The acting user, resolved from the JWT by the auth extractor.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    pub role: Role,
}

/// Transition errors. Converted to HTTP errors at the API boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("role '{role}' may not perform {action:?}")]
    PermissionDenied { role: Role, action: RoomAction },

    #[error("{0}")]
    Validation(String),

    #[error("problem '{0}' not found")]
    ProblemNotFound(String),
}

/// Minimal field set to persist for a transition.
///
/// `None` means "leave the stored field untouched"; for optional room
/// fields the inner `Option` distinguishes writing a value from clearing
/// the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    pub base_status: Option<BaseStatus>,
    pub blocked: Option<bool>,
    pub blocked_restore: Option<Option<BaseStatus>>,
    pub problems: Option<Vec<Problem>>,
    pub recleaning_reason: Option<Option<String>>,
    pub recleaning_evidence: Option<Option<String>>,
    pub last_cleaned_by: Option<String>,
    pub last_cleaned_at: Option<i64>,
    pub bed_configuration: Option<Option<BedConfiguration>>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn check(actor: &Actor, action: RoomAction) -> Result<(), TransitionError> {
    if actor.role.allows(action) {
        Ok(())
    } else {
        Err(TransitionError::PermissionDenied {
            role: actor.role,
            action,
        })
    }
}

/// Map a target base status to its capability-table action.
fn status_action(status: BaseStatus) -> RoomAction {
    match status {
        BaseStatus::Clean => RoomAction::SetClean,
        BaseStatus::Dirty => RoomAction::SetDirty,
        BaseStatus::Occupied => RoomAction::SetOccupied,
    }
}

/// Write a new base status into a room that may be blocked.
///
/// Blocking masks but does not discard status changes underneath: while
/// blocked, the captured restore point moves along with the base status so
/// a later unblock surfaces the latest condition.
fn write_base_status(room: &mut Room, patch: &mut RoomPatch, status: BaseStatus) {
    room.base_status = status;
    patch.base_status = Some(status);
    if room.blocked {
        room.blocked_restore = Some(status);
        patch.blocked_restore = Some(Some(status));
    }
}

/// Set the room's base status.
///
/// Cleaners may only move a room toward clean; supervisors may set any
/// status; maintenance never calls this. Setting clean stamps the cleaning
/// attribution and clears any re-clean overlay and pending bed check.
pub fn set_base_status(
    room: &Room,
    new_status: BaseStatus,
    actor: &Actor,
) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, status_action(new_status))?;

    let mut next = room.clone();
    let mut patch = RoomPatch::default();
    write_base_status(&mut next, &mut patch, new_status);

    if new_status == BaseStatus::Clean {
        let now = now_millis();
        next.last_cleaned_by = Some(actor.id.clone());
        next.last_cleaned_at = Some(now);
        next.recleaning_reason = None;
        next.recleaning_evidence = None;
        next.bed_configuration = None;

        patch.last_cleaned_by = Some(actor.id.clone());
        patch.last_cleaned_at = Some(now);
        patch.recleaning_reason = Some(None);
        patch.recleaning_evidence = Some(None);
        patch.bed_configuration = Some(None);
    }

    Ok((next, patch))
}

/// Block or unblock a room (supervisor only).
///
/// Blocking captures the current base status as a restore point; unblocking
/// restores it (falling back to dirty when the restore point is missing,
/// which only happens for records written before blocking existed) and
/// discards it.
pub fn toggle_block(room: &Room, actor: &Actor) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, RoomAction::ToggleBlock)?;

    let mut next = room.clone();
    let mut patch = RoomPatch::default();

    if room.blocked {
        let restored = room.blocked_restore.unwrap_or(BaseStatus::Dirty);
        next.blocked = false;
        next.base_status = restored;
        next.blocked_restore = None;

        patch.blocked = Some(false);
        patch.base_status = Some(restored);
        patch.blocked_restore = Some(None);
    } else {
        next.blocked = true;
        next.blocked_restore = Some(room.base_status);

        patch.blocked = Some(true);
        patch.blocked_restore = Some(Some(room.base_status));
    }

    Ok((next, patch))
}

/// Report a problem (cleaner or supervisor).
///
/// Appends a new record; existing problems are never rewritten.
pub fn report_problem(
    room: &Room,
    description: &str,
    evidence: Option<String>,
    actor: &Actor,
) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, RoomAction::ReportProblem)?;

    let description = description.trim();
    if description.is_empty() {
        return Err(TransitionError::Validation(
            "Problem description must not be empty".to_string(),
        ));
    }

    let mut next = room.clone();
    next.problems.push(Problem {
        id: Uuid::new_v4().to_string(),
        description: description.to_string(),
        reported_by: actor.id.clone(),
        reported_at: now_millis(),
        is_resolved: false,
        evidence,
    });

    let patch = RoomPatch {
        problems: Some(next.problems.clone()),
        ..RoomPatch::default()
    };
    Ok((next, patch))
}

/// Resolve a reported problem (supervisor or maintenance).
///
/// Flips the matching record's flag; the problem overlay clears through
/// derivation alone once no unresolved problems remain.
pub fn resolve_problem(
    room: &Room,
    problem_id: &str,
    actor: &Actor,
) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, RoomAction::ResolveProblem)?;

    let mut next = room.clone();
    let problem = next
        .problems
        .iter_mut()
        .find(|p| p.id == problem_id)
        .ok_or_else(|| TransitionError::ProblemNotFound(problem_id.to_string()))?;
    problem.is_resolved = true;

    let patch = RoomPatch {
        problems: Some(next.problems.clone()),
        ..RoomPatch::default()
    };
    Ok((next, patch))
}

/// Send a room back to housekeeping with context (supervisor only).
pub fn mark_for_reclean(
    room: &Room,
    reason: &str,
    evidence: Option<String>,
    actor: &Actor,
) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, RoomAction::MarkForReclean)?;

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(TransitionError::Validation(
            "Re-clean reason must not be empty".to_string(),
        ));
    }

    let mut next = room.clone();
    let mut patch = RoomPatch::default();
    write_base_status(&mut next, &mut patch, BaseStatus::Dirty);

    next.recleaning_reason = Some(reason.to_string());
    next.recleaning_evidence = evidence.clone();
    patch.recleaning_reason = Some(Some(reason.to_string()));
    patch.recleaning_evidence = Some(evidence);

    Ok((next, patch))
}

/// Flag a checkout needing bed-type-specific servicing (supervisor only).
pub fn mark_for_check(
    room: &Room,
    bed_configuration: BedConfiguration,
    actor: &Actor,
) -> Result<(Room, RoomPatch), TransitionError> {
    check(actor, RoomAction::MarkForCheck)?;

    let mut next = room.clone();
    let mut patch = RoomPatch::default();
    write_base_status(&mut next, &mut patch, BaseStatus::Dirty);

    next.bed_configuration = Some(bed_configuration);
    patch.bed_configuration = Some(Some(bed_configuration));

    Ok((next, patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::status::derive_display_status;
    use shared::models::DisplayStatus;

    fn room(base: BaseStatus) -> Room {
        Room {
            id: None,
            base_status: base,
            blocked: false,
            blocked_restore: None,
            problems: Vec::new(),
            recleaning_reason: None,
            recleaning_evidence: None,
            last_cleaned_by: None,
            last_cleaned_at: None,
            bed_configuration: None,
        }
    }

    fn cleaner() -> Actor {
        Actor {
            id: "staff:maria".into(),
            display_name: "Maria".into(),
            role: Role::Cleaner,
        }
    }

    fn supervisor() -> Actor {
        Actor {
            id: "staff:sofia".into(),
            display_name: "Sofia".into(),
            role: Role::Supervisor,
        }
    }

    fn maintenance() -> Actor {
        Actor {
            id: "staff:diego".into(),
            display_name: "Diego".into(),
            role: Role::Maintenance,
        }
    }

    #[test]
    fn maintenance_may_never_set_base_status() {
        let r = room(BaseStatus::Dirty);
        for status in [BaseStatus::Clean, BaseStatus::Dirty, BaseStatus::Occupied] {
            let err = set_base_status(&r, status, &maintenance()).unwrap_err();
            assert!(matches!(err, TransitionError::PermissionDenied { .. }));
        }
        // Room unchanged: transitions take &Room, callers keep the original.
        assert_eq!(r.base_status, BaseStatus::Dirty);
    }

    #[test]
    fn cleaner_may_only_move_toward_clean() {
        let r = room(BaseStatus::Dirty);
        assert!(set_base_status(&r, BaseStatus::Clean, &cleaner()).is_ok());
        assert!(set_base_status(&r, BaseStatus::Dirty, &cleaner()).is_err());
        assert!(set_base_status(&r, BaseStatus::Occupied, &cleaner()).is_err());
    }

    #[test]
    fn setting_clean_stamps_attribution_and_clears_reclean() {
        let mut r = room(BaseStatus::Dirty);
        r.recleaning_reason = Some("stains".into());
        r.recleaning_evidence = Some("/api/image/x.jpg".into());
        r.bed_configuration = Some(BedConfiguration::Double);

        let (next, patch) = set_base_status(&r, BaseStatus::Clean, &cleaner()).unwrap();
        assert_eq!(next.base_status, BaseStatus::Clean);
        assert_eq!(next.last_cleaned_by.as_deref(), Some("staff:maria"));
        assert!(next.last_cleaned_at.is_some());
        assert_eq!(next.recleaning_reason, None);
        assert_eq!(next.recleaning_evidence, None);
        assert_eq!(next.bed_configuration, None);

        // Patch carries exactly the touched fields.
        assert_eq!(patch.base_status, Some(BaseStatus::Clean));
        assert_eq!(patch.recleaning_reason, Some(None));
        assert_eq!(patch.problems, None);
        assert_eq!(patch.blocked, None);
    }

    #[test]
    fn setting_status_under_block_stays_blocked() {
        let (blocked_room, _) = toggle_block(&room(BaseStatus::Occupied), &supervisor()).unwrap();

        let (next, patch) =
            set_base_status(&blocked_room, BaseStatus::Clean, &supervisor()).unwrap();
        assert!(next.blocked);
        assert_eq!(next.base_status, BaseStatus::Clean);
        // The restore point tracks the write so unblock surfaces it.
        assert_eq!(next.blocked_restore, Some(BaseStatus::Clean));
        assert_eq!(patch.blocked, None); // block flag untouched

        let (unblocked, _) = toggle_block(&next, &supervisor()).unwrap();
        assert!(!unblocked.blocked);
        assert_eq!(unblocked.base_status, BaseStatus::Clean);
    }

    #[test]
    fn double_toggle_restores_base_status() {
        for base in [BaseStatus::Clean, BaseStatus::Dirty, BaseStatus::Occupied] {
            let r = room(base);
            let (blocked, patch) = toggle_block(&r, &supervisor()).unwrap();
            assert!(blocked.blocked);
            assert_eq!(blocked.blocked_restore, Some(base));
            assert_eq!(blocked.base_status, base);
            // Blocking never touches problems or reclean fields.
            assert_eq!(patch.problems, None);
            assert_eq!(patch.recleaning_reason, None);

            let (unblocked, _) = toggle_block(&blocked, &supervisor()).unwrap();
            assert!(!unblocked.blocked);
            assert_eq!(unblocked.base_status, base);
            assert_eq!(unblocked.blocked_restore, None);
        }
    }

    #[test]
    fn unblock_without_restore_point_falls_back_to_dirty() {
        let mut r = room(BaseStatus::Clean);
        r.blocked = true;
        r.blocked_restore = None; // legacy record
        let (next, _) = toggle_block(&r, &supervisor()).unwrap();
        assert_eq!(next.base_status, BaseStatus::Dirty);
    }

    #[test]
    fn toggle_block_is_supervisor_only() {
        let r = room(BaseStatus::Dirty);
        assert!(toggle_block(&r, &cleaner()).is_err());
        assert!(toggle_block(&r, &maintenance()).is_err());
    }

    #[test]
    fn report_problem_appends_and_overlays() {
        let r = room(BaseStatus::Dirty); // room 101 scenario
        let (next, patch) = report_problem(&r, "AC broken", None, &cleaner()).unwrap();

        assert_eq!(next.problems.len(), 1);
        let p = &next.problems[0];
        assert_eq!(p.description, "AC broken");
        assert_eq!(p.reported_by, "staff:maria");
        assert!(!p.is_resolved);
        assert_eq!(
            derive_display_status(&next),
            DisplayStatus::Problem {
                base: BaseStatus::Dirty
            }
        );
        // Minimal write: only the problems array.
        assert!(patch.problems.is_some());
        assert_eq!(patch.base_status, None);
    }

    #[test]
    fn report_problem_rejects_blank_description() {
        let r = room(BaseStatus::Dirty);
        let err = report_problem(&r, "   ", None, &cleaner()).unwrap_err();
        assert!(matches!(err, TransitionError::Validation(_)));
    }

    #[test]
    fn maintenance_may_not_report_problems() {
        let r = room(BaseStatus::Dirty);
        assert!(report_problem(&r, "AC broken", None, &maintenance()).is_err());
    }

    #[test]
    fn resolving_last_problem_clears_overlay_without_status_write() {
        let base = room(BaseStatus::Occupied);
        let (with_problem, _) = report_problem(&base, "TV remote missing", None, &cleaner()).unwrap();
        let problem_id = with_problem.problems[0].id.clone();

        let (next, patch) = resolve_problem(&with_problem, &problem_id, &maintenance()).unwrap();
        assert!(next.problems[0].is_resolved);
        // Record retained for the audit trail.
        assert_eq!(next.problems.len(), 1);
        // Overlay is derived, not stored: no extra mutation needed.
        assert_eq!(patch.base_status, None);
        assert_eq!(derive_display_status(&next), DisplayStatus::Occupied);
    }

    #[test]
    fn resolve_unknown_problem_is_not_found() {
        let r = room(BaseStatus::Dirty);
        let err = resolve_problem(&r, "nope", &supervisor()).unwrap_err();
        assert_eq!(err, TransitionError::ProblemNotFound("nope".into()));
    }

    #[test]
    fn cleaner_may_not_resolve_problems() {
        let (r, _) = report_problem(&room(BaseStatus::Dirty), "broken lamp", None, &cleaner()).unwrap();
        let id = r.problems[0].id.clone();
        assert!(resolve_problem(&r, &id, &cleaner()).is_err());
    }

    #[test]
    fn mark_for_reclean_sets_dirty_with_reason() {
        let r = room(BaseStatus::Clean);
        let (next, _) =
            mark_for_reclean(&r, "stains on carpet", Some("/api/image/e.jpg".into()), &supervisor())
                .unwrap();
        assert_eq!(next.base_status, BaseStatus::Dirty);
        assert_eq!(next.recleaning_reason.as_deref(), Some("stains on carpet"));
        assert_eq!(next.recleaning_evidence.as_deref(), Some("/api/image/e.jpg"));
        assert_eq!(
            derive_display_status(&next),
            DisplayStatus::Reclean { occupied: false }
        );
    }

    #[test]
    fn mark_for_reclean_requires_reason_and_supervisor() {
        let r = room(BaseStatus::Clean);
        assert!(matches!(
            mark_for_reclean(&r, "", None, &supervisor()).unwrap_err(),
            TransitionError::Validation(_)
        ));
        assert!(mark_for_reclean(&r, "stains", None, &cleaner()).is_err());
        assert!(mark_for_reclean(&r, "stains", None, &maintenance()).is_err());
    }

    #[test]
    fn mark_for_check_records_bed_configuration() {
        let r = room(BaseStatus::Occupied);
        let (next, patch) = mark_for_check(&r, BedConfiguration::Double, &supervisor()).unwrap();
        assert_eq!(next.base_status, BaseStatus::Dirty);
        assert_eq!(next.bed_configuration, Some(BedConfiguration::Double));
        assert_eq!(patch.bed_configuration, Some(Some(BedConfiguration::Double)));
        assert!(mark_for_check(&r, BedConfiguration::Single, &cleaner()).is_err());
    }
}
