use std::{sync::Arc, thread};

use async_trait::async_trait;
use fanout_core::{Task, TaskError};
use fanout_model::TaskId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::delay::{Delay, DelayRef, FixedDelay};

/// I/O-bound task: logs its start, blocks on a [`Delay`], logs its completion.
///
/// The log lines carry the name of the OS thread the task ran on, which makes the difference
/// between pool workers and runtime carriers visible.
pub struct SimulatedIoTask {
    id: TaskId,
    delay: DelayRef,
}

impl SimulatedIoTask {
    pub fn new(id: impl Into<TaskId>, delay: DelayRef) -> Self {
        Self {
            id: id.into(),
            delay,
        }
    }

    /// Task with the classic fixed 100ms delay.
    pub fn with_default_delay(id: impl Into<TaskId>) -> Self {
        Self::new(id, Arc::new(FixedDelay::default()))
    }
}

#[async_trait]
impl Task for SimulatedIoTask {
    fn id(&self) -> TaskId {
        self.id
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let id = self.id;
        debug!(target: "fanout.exec.io", %id, thread = carrier(), "I/O task started");

        tokio::select! {
            _ = self.delay.wait(id) => {}
            _ = ctx.cancelled() => {
                warn!(target: "fanout.exec.io", %id, thread = carrier(), "I/O task interrupted");
                return Err(TaskError::Canceled);
            }
        }

        debug!(target: "fanout.exec.io", %id, thread = carrier(), "I/O task completed");
        Ok(())
    }
}

fn carrier() -> String {
    let t = thread::current();
    t.name().map(str::to_owned).unwrap_or_else(|| format!("{:?}", t.id()))
}
