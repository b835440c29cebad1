use std::time::Duration;

use fanout_model::{BatchId, ExecutionOutcome, RunReport, RunnerMode, TaskFailure, TaskRecord};
use tracing::warn;

use crate::observer::BatchInfo;

/// Order-independent accumulator that turns task records into a [`RunReport`].
///
/// Counters only ever add; `failures` is sorted on [`ReportAggregator::finish`], so the same set of
/// records yields the same report no matter the arrival order.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    batch_id: BatchId,
    mode: RunnerMode,
    submitted: usize,
    completed: usize,
    failed: usize,
    cancelled: usize,
    timed_out: usize,
    failures: Vec<TaskFailure>,
}

impl ReportAggregator {
    pub fn new(batch: &BatchInfo) -> Self {
        Self {
            batch_id: batch.id,
            mode: batch.mode,
            submitted: batch.submitted,
            completed: 0,
            failed: 0,
            cancelled: 0,
            timed_out: 0,
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, record: &TaskRecord) {
        match &record.outcome {
            ExecutionOutcome::Completed => self.completed += 1,
            ExecutionOutcome::Cancelled => self.cancelled += 1,
            ExecutionOutcome::Failed(reason) => {
                self.failed += 1;
                if reason.is_timeout() {
                    self.timed_out += 1;
                }
                self.failures.push(TaskFailure {
                    id: record.id,
                    reason: reason.clone(),
                });
            }
        }
    }

    /// Number of records accumulated so far.
    pub fn recorded(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }

    /// Seal the report.
    ///
    /// Tasks that never produced a record (their execution context vanished) are counted as
    /// cancelled, so `resolved() == tasks_submitted` always holds.
    pub fn finish(mut self, wall_clock: Duration) -> RunReport {
        let recorded = self.recorded();
        if recorded < self.submitted {
            let missing = self.submitted - recorded;
            warn!(
                target: "fanout.core.report",
                batch = %self.batch_id,
                missing,
                "tasks ended without an outcome; counting them as cancelled"
            );
            self.cancelled += missing;
        }
        self.failures.sort_unstable();

        RunReport {
            batch_id: self.batch_id,
            mode: self.mode,
            tasks_submitted: self.submitted,
            tasks_completed: self.completed,
            tasks_failed: self.failed,
            tasks_cancelled: self.cancelled,
            tasks_timed_out: self.timed_out,
            failures: self.failures,
            wall_clock,
        }
    }
}
