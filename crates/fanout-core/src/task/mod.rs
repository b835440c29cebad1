//! # Task abstractions.
//!
//! - [`Task`] - trait for a unit of work that may block and may fail
//! - [`TaskFn`] - closure-based task implementation
//! - [`BoxTask`] - owned task as submitted to a runner
//! - [`TaskError`] - what a task returns when it does not succeed

mod error;
mod func;

pub use error::TaskError;
pub use func::TaskFn;

use async_trait::async_trait;
use fanout_model::TaskId;
use tokio_util::sync::CancellationToken;

/// One unit of independent, potentially blocking work.
///
/// `run` may be called concurrently with other tasks' `run`; tasks must not share mutable state
/// unless they synchronize it themselves.
///
/// The token fires when the batch is cancelled. Tasks should await it next to their blocking
/// operation and return [`TaskError::Canceled`]; the runner drops tasks that do not, at their next
/// await point, and records them as cancelled either way.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    fn id(&self) -> TaskId;

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}

/// Owned task; a batch is a `Vec<BoxTask>` moved into the runner.
pub type BoxTask = Box<dyn Task>;
