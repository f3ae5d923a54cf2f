//! Terminal-state tracking for completion cells

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a completion cell
///
/// A cell starts `Pending`. It may be claimed (`Running`) by whoever is going
/// to produce its value, and it ends either `Cancelled` or `Finished`.
///
/// The state only tracks *whether* a value has been produced. The value
/// itself lives in a separate slot that pipelined cells keep rewriting after
/// the cell is already `Finished`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FutureState {
    /// Created, nobody has claimed it yet
    #[default]
    Pending,
    /// Claimed by a producer, can no longer be cancelled
    Running,
    /// Cancelled before a producer claimed it
    Cancelled,
    /// A result has been assigned at least once
    Finished,
}

impl FutureState {
    /// Whether the state is terminal (cancelled or finished)
    pub fn is_terminal(self) -> bool {
        matches!(self, FutureState::Cancelled | FutureState::Finished)
    }

    /// Canonical lowercase name, used in logs and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            FutureState::Pending => "pending",
            FutureState::Running => "running",
            FutureState::Cancelled => "cancelled",
            FutureState::Finished => "finished",
        }
    }
}

impl fmt::Display for FutureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
