use std::{any::Any, panic::AssertUnwindSafe, time::Duration};

use fanout_model::{ExecutionOutcome, FailureReason, TaskRecord};
use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    observer::{BatchInfo, Observer, Observers},
    task::{Task, TaskError},
};

/// Per-run state shared by every execution context of one batch.
pub(crate) struct Batch {
    pub info: BatchInfo,
    pub timeout: Option<Duration>,
    pub observers: Observers,
}

/// Drive one task to its terminal outcome and notify observers.
///
/// - a token that already fired skips the task entirely;
/// - a token firing mid-run drops the task future at its current await point;
/// - the optional timeout drops it at the deadline;
/// - a panic inside the task is caught and recorded, never propagated.
pub(crate) async fn execute(task: &dyn Task, ctx: &CancellationToken, batch: &Batch) -> TaskRecord {
    let id = task.id();

    if ctx.is_cancelled() {
        trace!(target: "fanout.core.exec", %id, "batch cancelled before start");
        let record = TaskRecord::skipped(id);
        batch.observers.on_task_finish(&batch.info, &record);
        return record;
    }

    batch.observers.on_task_start(&batch.info, id);
    let started = Instant::now();

    let run = async {
        let guarded = AssertUnwindSafe(task.run(ctx.clone())).catch_unwind();
        let res = match batch.timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(res) => res,
                Err(_) => Ok(Err(TaskError::Timeout { timeout: limit })),
            },
            None => guarded.await,
        };
        match res {
            Ok(res) => outcome_of(res),
            Err(payload) => ExecutionOutcome::Failed(FailureReason::Panicked(panic_message(&*payload))),
        }
    };

    let outcome = tokio::select! {
        biased;
        _ = ctx.cancelled() => ExecutionOutcome::Cancelled,
        outcome = run => outcome,
    };

    let record = TaskRecord::new(id, outcome, started.elapsed());
    trace!(target: "fanout.core.exec", %id, outcome = record.outcome.label(), "task finished");
    batch.observers.on_task_finish(&batch.info, &record);
    record
}

fn outcome_of(res: Result<(), TaskError>) -> ExecutionOutcome {
    match res {
        Ok(()) => ExecutionOutcome::Completed,
        Err(TaskError::Fail { reason }) => ExecutionOutcome::failed(reason),
        Err(TaskError::Timeout { timeout }) => {
            ExecutionOutcome::timed_out(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
        }
        Err(TaskError::Canceled) => ExecutionOutcome::Cancelled,
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
