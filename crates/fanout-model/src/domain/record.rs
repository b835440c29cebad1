use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ExecutionOutcome, FailureReason, TaskId};

/// Result of one finished task, as delivered to observers and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub outcome: ExecutionOutcome,
    /// `false` when the batch was cancelled before the task got a chance to run.
    pub started: bool,
    /// Time between the task being picked up and reaching its outcome.
    #[serde(rename = "elapsedMs", with = "crate::serde_ms")]
    pub elapsed: Duration,
}

impl TaskRecord {
    pub fn new(id: TaskId, outcome: ExecutionOutcome, elapsed: Duration) -> Self {
        Self {
            id,
            outcome,
            started: true,
            elapsed,
        }
    }

    /// Record for a task that reached `outcome` without ever being started.
    pub fn unstarted(id: TaskId, outcome: ExecutionOutcome) -> Self {
        Self {
            id,
            outcome,
            started: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Record for a task that never ran because the batch was cancelled first.
    pub fn skipped(id: TaskId) -> Self {
        Self::unstarted(id, ExecutionOutcome::Cancelled)
    }
}

/// One failed task listed in a [`crate::RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub id: TaskId,
    pub reason: FailureReason,
}
