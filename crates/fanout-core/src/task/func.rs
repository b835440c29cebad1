use std::future::Future;

use async_trait::async_trait;
use fanout_model::TaskId;
use tokio_util::sync::CancellationToken;

use super::{BoxTask, Task, TaskError};

/// Task backed by a closure that produces a fresh future per run.
///
/// ```rust
/// use fanout_core::{Task, TaskError, TaskFn};
/// use tokio_util::sync::CancellationToken;
///
/// let task = TaskFn::boxed(1, |ctx: CancellationToken| async move {
///     if ctx.is_cancelled() {
///         return Err(TaskError::Canceled);
///     }
///     Ok(())
/// });
/// assert_eq!(task.id().get(), 1);
/// ```
pub struct TaskFn<F> {
    id: TaskId,
    f: F,
}

impl<F, Fut> TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    pub fn new(id: impl Into<TaskId>, f: F) -> Self {
        Self { id: id.into(), f }
    }

    pub fn boxed(id: impl Into<TaskId>, f: F) -> BoxTask {
        Box::new(Self::new(id, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn id(&self) -> TaskId {
        self.id
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
