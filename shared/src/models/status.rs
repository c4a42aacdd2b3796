//! Room status enums
//!
//! `BaseStatus` is the stored condition of a room. `DisplayStatus` is the
//! derived value shown to users once overlays (blocked, problem, reclean)
//! are applied. The derivation itself lives server-side; clients only
//! consume the result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A room's condition independent of any overlay. Always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseStatus {
    Clean,
    Dirty,
    Occupied,
}

impl fmt::Display for BaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Dirty => write!(f, "dirty"),
            Self::Occupied => write!(f, "occupied"),
        }
    }
}

/// The single derived status shown to users.
///
/// Exactly one value is derivable from any valid room. Overlay variants
/// carry the underlying base status as supplementary info so the UI can
/// show what is beneath the overlay without a second request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayStatus {
    Clean,
    Dirty,
    Occupied,
    /// Administratively frozen; `base` is the status beneath the block.
    Blocked { base: BaseStatus },
    /// At least one unresolved problem; `base` is the status beneath.
    Problem { base: BaseStatus },
    /// Sent back to housekeeping; `occupied` marks the
    /// reclean-while-occupied variant.
    Reclean { occupied: bool },
}

impl DisplayStatus {
    /// The room functionally needs cleaning (plain dirty or any reclean).
    pub fn needs_cleaning(&self) -> bool {
        matches!(self, Self::Dirty | Self::Reclean { .. })
    }
}

/// Bed configuration recorded by a supervisor "mark for check" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedConfiguration {
    Single,
    Double,
}
