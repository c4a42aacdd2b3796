//! Status Derivation Engine
//!
//! Maps a room's stored fields to the single displayed status. The
//! precedence is a total order with no ties, so exactly one rule fires:
//!
//! 1. blocked
//! 2. any unresolved problem
//! 3. re-clean overlay (occupied variant when the base is occupied)
//! 4. base status verbatim
//!
//! The function is total, pure, and idempotent; overlays carry the
//! underlying base status so it is never hidden from the caller.

use crate::db::models::Room;
use shared::models::{BaseStatus, DisplayStatus};

/// Derive the displayed status for a room.
pub fn derive_display_status(room: &Room) -> DisplayStatus {
    if room.blocked {
        return DisplayStatus::Blocked {
            base: room.base_status,
        };
    }

    if room.has_unresolved_problems() {
        return DisplayStatus::Problem {
            base: room.base_status,
        };
    }

    if room.recleaning_reason.is_some() {
        return DisplayStatus::Reclean {
            occupied: room.base_status == BaseStatus::Occupied,
        };
    }

    match room.base_status {
        BaseStatus::Clean => DisplayStatus::Clean,
        BaseStatus::Dirty => DisplayStatus::Dirty,
        BaseStatus::Occupied => DisplayStatus::Occupied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Problem;

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

    fn unresolved_problem() -> Problem {
        Problem {
            id: "p1".into(),
            description: "AC broken".into(),
            reported_by: "u1".into(),
            reported_at: 1,
            is_resolved: false,
            evidence: None,
        }
    }

    #[test]
    fn base_status_passes_through_without_overlays() {
        assert_eq!(derive_display_status(&room(BaseStatus::Clean)), DisplayStatus::Clean);
        assert_eq!(derive_display_status(&room(BaseStatus::Dirty)), DisplayStatus::Dirty);
        assert_eq!(
            derive_display_status(&room(BaseStatus::Occupied)),
            DisplayStatus::Occupied
        );
    }

    #[test]
    fn blocked_wins_over_problem() {
        let mut r = room(BaseStatus::Dirty);
        r.blocked = true;
        r.problems.push(unresolved_problem());
        assert_eq!(
            derive_display_status(&r),
            DisplayStatus::Blocked {
                base: BaseStatus::Dirty
            }
        );
    }

    #[test]
    fn problem_wins_over_reclean() {
        let mut r = room(BaseStatus::Occupied);
        r.problems.push(unresolved_problem());
        r.recleaning_reason = Some("stains".into());
        assert_eq!(
            derive_display_status(&r),
            DisplayStatus::Problem {
                base: BaseStatus::Occupied
            }
        );
    }

    #[test]
    fn resolved_problems_do_not_trigger_overlay() {
        let mut r = room(BaseStatus::Occupied);
        let mut p = unresolved_problem();
        p.is_resolved = true;
        r.problems.push(p);
        assert_eq!(derive_display_status(&r), DisplayStatus::Occupied);
    }

    #[test]
    fn reclean_while_occupied_is_a_distinct_variant() {
        let mut r = room(BaseStatus::Occupied);
        r.recleaning_reason = Some("stains".into());
        assert_eq!(
            derive_display_status(&r),
            DisplayStatus::Reclean { occupied: true }
        );

        let mut r = room(BaseStatus::Dirty);
        r.recleaning_reason = Some("stains".into());
        assert_eq!(
            derive_display_status(&r),
            DisplayStatus::Reclean { occupied: false }
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut r = room(BaseStatus::Dirty);
        r.blocked = true;
        r.problems.push(unresolved_problem());
        r.recleaning_reason = Some("x".into());

        let first = derive_display_status(&r);
        let second = derive_display_status(&r);
        assert_eq!(first, second);
    }

    #[test]
    fn every_combination_yields_exactly_one_status() {
        // Totality over overlay combinations for each base status.
        for base in [BaseStatus::Clean, BaseStatus::Dirty, BaseStatus::Occupied] {
            for blocked in [false, true] {
                for with_problem in [false, true] {
                    for with_reclean in [false, true] {
                        let mut r = room(base);
                        r.blocked = blocked;
                        if with_problem {
                            r.problems.push(unresolved_problem());
                        }
                        if with_reclean {
                            r.recleaning_reason = Some("reason".into());
                        }
                        // Must not panic, and the top rule wins.
                        let status = derive_display_status(&r);
                        if blocked {
                            assert_eq!(status, DisplayStatus::Blocked { base });
                        } else if with_problem {
                            assert_eq!(status, DisplayStatus::Problem { base });
                        } else if with_reclean {
                            assert_eq!(
                                status,
                                DisplayStatus::Reclean {
                                    occupied: base == BaseStatus::Occupied
                                }
                            );
                        }
                    }
                }
            }
        }
    }
}
