//! Injectable blocking operations.
//!
//! A [`Delay`] stands in for the part of a task that waits on the outside world. Production code
//! sleeps; tests plug in their own implementation to control exactly when each task unblocks.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use fanout_model::TaskId;

/// How long the simulated I/O of the classic demo takes.
pub const SIMULATED_IO_DELAY: Duration = Duration::from_millis(100);

#[async_trait]
pub trait Delay: Send + Sync {
    /// Block (asynchronously) on behalf of task `id`.
    async fn wait(&self, id: TaskId);
}

pub type DelayRef = Arc<dyn Delay>;

/// Sleeps for the same duration for every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(SIMULATED_IO_DELAY)
    }
}

#[async_trait]
impl Delay for FixedDelay {
    async fn wait(&self, _id: TaskId) {
        tokio::time::sleep(self.0).await;
    }
}

/// Variable but bounded and reproducible latency: `base + step * (id % steps)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteppedDelay {
    pub base: Duration,
    pub step: Duration,
    pub steps: u32,
}

impl SteppedDelay {
    pub fn new(base: Duration, step: Duration, steps: u32) -> Self {
        Self {
            base,
            step,
            steps: steps.max(1),
        }
    }

    /// Delay assigned to task `id`.
    pub fn for_task(&self, id: TaskId) -> Duration {
        let k = (id.get() % u64::from(self.steps.max(1))) as u32;
        self.base + self.step * k
    }

    /// Longest delay any task can get.
    pub fn max(&self) -> Duration {
        self.base + self.step * (self.steps.max(1) - 1)
    }
}

#[async_trait]
impl Delay for SteppedDelay {
    async fn wait(&self, id: TaskId) {
        tokio::time::sleep(self.for_task(id)).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _id: TaskId) {}
}
