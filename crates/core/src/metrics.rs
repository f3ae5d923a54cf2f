//! Per-cell counters

use serde::{Deserialize, Serialize};

/// Counters describing what a cell's pipeline has done so far.
///
/// A snapshot; reading it never blocks stage execution for longer than a
/// copy under the state lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Times `set_result` was accepted
    pub assignments: u64,
    /// Callbacks registered on the cell
    pub stages_registered: u64,
    /// Stages that ran and committed a result
    pub stages_executed: u64,
    /// Stages whose callback returned an error
    pub stages_failed: u64,
}

impl PipelineMetrics {
    /// Fraction of executed stages that failed (0.0 when nothing ran)
    pub fn failure_rate(&self) -> f64 {
        let total = self.stages_executed + self.stages_failed;
        if total == 0 {
            0.0
        } else {
            self.stages_failed as f64 / total as f64
        }
    }
}
