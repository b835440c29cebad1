//! Bounded and unbounded concurrent batch execution.
//!
//! A batch of [`Task`]s is handed to a runner, which drives every task to a terminal outcome
//! before returning a [`RunReport`](fanout_model::RunReport):
//! - [`BoundedRunner`] keeps a fixed pool of OS worker threads;
//! - [`UnboundedRunner`] gives every task its own runtime task;
//! - [`run_batch`] / [`run_batch_blocking`] pick one from a [`RunnerConfig`](fanout_model::RunnerConfig).

pub mod error;
pub use error::RunnerError;

pub mod observer;
pub use observer::{BatchInfo, Observer, ObserverRef, Observers};

pub mod report;
pub use report::ReportAggregator;

pub mod runner;
pub use runner::{BoundedRunner, TaskRunner, UnboundedRunner, run_batch, run_batch_blocking};

pub mod task;
pub use task::{BoxTask, Task, TaskError, TaskFn};

pub mod prelude {
    pub use crate::{BoxTask, Task, TaskError, TaskFn, TaskRunner, run_batch};
    pub use fanout_model::{ExecutionOutcome, RunReport, RunnerConfig, TaskId};
    pub use tokio_util::sync::CancellationToken;
}
