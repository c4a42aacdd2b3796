//! Role Model
//!
//! Closed set of staff roles and the capability table gating room
//! transitions. Permission checks happen once per action through
//! [`Role::allows`] instead of ad hoc string comparisons scattered
//! across handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Staff role (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Cleaner,
    Supervisor,
    Maintenance,
}

/// A role-gated room transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomAction {
    /// Set base status to clean (stamps attribution).
    SetClean,
    /// Set base status to dirty.
    SetDirty,
    /// Set base status to occupied.
    SetOccupied,
    ToggleBlock,
    ReportProblem,
    ResolveProblem,
    MarkForReclean,
    MarkForCheck,
}

/// All actions, used to enumerate a role's permitted set.
pub const ALL_ACTIONS: &[RoomAction] = &[
    RoomAction::SetClean,
    RoomAction::SetDirty,
    RoomAction::SetOccupied,
    RoomAction::ToggleBlock,
    RoomAction::ReportProblem,
    RoomAction::ResolveProblem,
    RoomAction::MarkForReclean,
    RoomAction::MarkForCheck,
];

impl Role {
    /// Capability table: may this role perform the action at all?
    ///
    /// - Cleaner moves rooms toward clean and reports problems.
    /// - Supervisor performs every transition.
    /// - Maintenance only resolves problems.
    pub fn allows(&self, action: RoomAction) -> bool {
        use RoomAction::*;
        match self {
            Role::Supervisor => true,
            Role::Cleaner => matches!(action, SetClean | ReportProblem),
            Role::Maintenance => matches!(action, ResolveProblem),
        }
    }

    /// The subset of [`ALL_ACTIONS`] this role may perform.
    pub fn permitted_actions(&self) -> Vec<RoomAction> {
        ALL_ACTIONS
            .iter()
            .copied()
            .filter(|a| self.allows(*a))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cleaner => write!(f, "cleaner"),
            Self::Supervisor => write!(f, "supervisor"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// Unknown role string error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cleaner" => Ok(Role::Cleaner),
            "supervisor" => Ok(Role::Supervisor),
            "maintenance" => Ok(Role::Maintenance),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
