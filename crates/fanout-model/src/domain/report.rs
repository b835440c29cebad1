use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{BatchId, RunnerMode, TaskFailure};

/// Aggregate outcome summary for one batch.
///
/// Built by the runner once every submitted task has reached a terminal outcome.
/// `tasks_completed + tasks_failed + tasks_cancelled == tasks_submitted` holds for
/// every report a runner hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub batch_id: BatchId,
    pub mode: RunnerMode,
    pub tasks_submitted: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub tasks_cancelled: usize,
    /// Subset of `tasks_failed` that hit the per-task timeout.
    pub tasks_timed_out: usize,
    /// Every failed task with its reason, ordered by id then reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TaskFailure>,
    /// Wall-clock time from submission of the first task to the barrier releasing.
    #[serde(rename = "wallClockMs", with = "crate::serde_ms")]
    pub wall_clock: Duration,
}

impl RunReport {
    /// Number of tasks that reached a terminal outcome.
    #[inline]
    pub fn resolved(&self) -> usize {
        self.tasks_completed + self.tasks_failed + self.tasks_cancelled
    }

    /// Returns `true` if every submitted task completed.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.tasks_completed == self.tasks_submitted
    }

    /// Returns `true` if at least one task failed or was cancelled.
    #[inline]
    pub fn is_partial(&self) -> bool {
        !self.is_clean()
    }

    /// Completed tasks per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.wall_clock.as_secs_f64();
        if secs > 0.0 {
            self.tasks_completed as f64 / secs
        } else {
            0.0
        }
    }
}
