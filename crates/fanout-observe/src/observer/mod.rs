use fanout_core::{BatchInfo, Observer};
use fanout_model::{ExecutionOutcome, FailureReason, RunReport, TaskId, TaskRecord};
use tracing::{debug, info, warn};

/// [`Observer`] that writes every runner event to `tracing`.
///
/// Task starts and completions go to `debug`, failures to `warn`, cancellations and batch
/// boundaries to `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn message_for(outcome: &ExecutionOutcome) -> &'static str {
    match outcome {
        ExecutionOutcome::Completed => "task completed",
        ExecutionOutcome::Failed(FailureReason::Task(_)) => "task failed",
        ExecutionOutcome::Failed(FailureReason::Timeout { .. }) => "task exceeded its timeout",
        ExecutionOutcome::Failed(FailureReason::Panicked(_)) => "task panicked",
        ExecutionOutcome::Cancelled => "task cancelled",
    }
}

impl Observer for TracingObserver {
    fn on_batch_start(&self, batch: &BatchInfo) {
        info!(
            target: "fanout.observe",
            batch = %batch.id,
            mode = %batch.mode,
            submitted = batch.submitted,
            "batch started"
        );
    }

    fn on_task_start(&self, batch: &BatchInfo, id: TaskId) {
        debug!(target: "fanout.observe", batch = %batch.id, task = %id, "task started");
    }

    fn on_task_finish(&self, batch: &BatchInfo, record: &TaskRecord) {
        let msg = message_for(&record.outcome);
        let elapsed_ms = record.elapsed.as_millis() as u64;

        match &record.outcome {
            ExecutionOutcome::Completed => {
                debug!(target: "fanout.observe", batch = %batch.id, task = %record.id, elapsed_ms, "{msg}")
            }
            ExecutionOutcome::Failed(reason) => warn!(
                target: "fanout.observe",
                batch = %batch.id,
                task = %record.id,
                kind = reason.label(),
                reason = %reason,
                elapsed_ms,
                "{msg}"
            ),
            ExecutionOutcome::Cancelled => info!(
                target: "fanout.observe",
                batch = %batch.id,
                task = %record.id,
                started = record.started,
                "{msg}"
            ),
        }
    }

    fn on_batch_finish(&self, report: &RunReport) {
        info!(
            target: "fanout.observe",
            batch = %report.batch_id,
            mode = %report.mode,
            submitted = report.tasks_submitted,
            completed = report.tasks_completed,
            failed = report.tasks_failed,
            timed_out = report.tasks_timed_out,
            cancelled = report.tasks_cancelled,
            wall_clock_ms = report.wall_clock.as_millis() as u64,
            "batch finished"
        );
    }
}
