//! Batch runners.
//!
//! Two strategies share one contract: consume a batch, drive every task to a terminal
//! [`fanout_model::ExecutionOutcome`], and only then hand back a [`RunReport`].
//! - [`BoundedRunner`] uses a fixed pool of OS worker threads.
//! - [`UnboundedRunner`] spawns one runtime task per submitted task.
//!
//! [`TaskRunner`] picks one of them from a [`RunnerConfig`].

mod bounded;
mod execute;
mod unbounded;

pub use bounded::BoundedRunner;
pub use unbounded::UnboundedRunner;

use std::time::Duration;

use fanout_model::{RunReport, RunnerConfig, RunnerMode};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::{
    error::RunnerError,
    observer::{ObserverRef, Observers},
    task::BoxTask,
};

/// Options every runner accepts before `run`.
#[derive(Clone)]
struct Settings {
    timeout: Option<Duration>,
    observers: Observers,
    cancel: CancellationToken,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: None,
            observers: Observers::new(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Runner selected from a [`RunnerConfig`].
pub enum TaskRunner {
    Bounded(BoundedRunner),
    Unbounded(UnboundedRunner),
}

impl TaskRunner {
    /// Validate `config` and build the runner it selects.
    ///
    /// For a bounded config this spawns the worker pool, so resource exhaustion is reported here
    /// rather than during `run`.
    pub fn new(config: &RunnerConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let runner = match config.concurrency_limit {
            Some(limit) => TaskRunner::Bounded(BoundedRunner::new(limit)?),
            None => TaskRunner::Unbounded(UnboundedRunner::new()?),
        };
        Ok(match config.per_task_timeout {
            Some(timeout) => runner.with_timeout(timeout),
            None => runner,
        })
    }

    pub fn mode(&self) -> RunnerMode {
        match self {
            TaskRunner::Bounded(r) => r.mode(),
            TaskRunner::Unbounded(r) => r.mode(),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            TaskRunner::Bounded(r) => TaskRunner::Bounded(r.with_timeout(timeout)),
            TaskRunner::Unbounded(r) => TaskRunner::Unbounded(r.with_timeout(timeout)),
        }
    }

    pub fn with_observer(self, observer: ObserverRef) -> Self {
        match self {
            TaskRunner::Bounded(r) => TaskRunner::Bounded(r.with_observer(observer)),
            TaskRunner::Unbounded(r) => TaskRunner::Unbounded(r.with_observer(observer)),
        }
    }

    pub fn with_cancel_token(self, token: CancellationToken) -> Self {
        match self {
            TaskRunner::Bounded(r) => TaskRunner::Bounded(r.with_cancel_token(token)),
            TaskRunner::Unbounded(r) => TaskRunner::Unbounded(r.with_cancel_token(token)),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        match self {
            TaskRunner::Bounded(r) => r.cancel_token(),
            TaskRunner::Unbounded(r) => r.cancel_token(),
        }
    }

    /// Run the batch to completion. Resolves only after every task has a terminal outcome.
    pub async fn run(self, tasks: Vec<BoxTask>) -> RunReport {
        match self {
            TaskRunner::Bounded(r) => r.run(tasks).await,
            TaskRunner::Unbounded(r) => r.run(tasks).await,
        }
    }
}

/// Build a runner from `config`, run `tasks` on it and return the report.
#[instrument(level = "info", skip_all, fields(tasks = tasks.len(), mode = %config.mode()))]
pub async fn run_batch(tasks: Vec<BoxTask>, config: &RunnerConfig) -> Result<RunReport, RunnerError> {
    let report = TaskRunner::new(config)?.run(tasks).await;
    info!(
        target: "fanout.core",
        batch = %report.batch_id,
        completed = report.tasks_completed,
        failed = report.tasks_failed,
        cancelled = report.tasks_cancelled,
        wall_clock_ms = report.wall_clock.as_millis() as u64,
        "batch finished"
    );
    Ok(report)
}

/// Blocking variant of [`run_batch`] for callers without an async runtime.
///
/// Builds a private multi-thread runtime for the duration of the call. Calling it from inside a
/// runtime is rejected with [`RunnerError::Runtime`].
pub fn run_batch_blocking(tasks: Vec<BoxTask>, config: &RunnerConfig) -> Result<RunReport, RunnerError> {
    if Handle::try_current().is_ok() {
        return Err(RunnerError::Runtime(
            "run_batch_blocking called from inside an async runtime".into(),
        ));
    }
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("fanout-rt")
        .build()
        .map_err(|e| RunnerError::Runtime(e.to_string()))?;

    rt.block_on(run_batch(tasks, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    use fanout_model::ConfigError;
    use tokio_util::sync::CancellationToken;

    use crate::task::{TaskError, TaskFn};

    fn sleepers(n: u64, d: Duration) -> Vec<BoxTask> {
        (0..n)
            .map(|i| {
                TaskFn::boxed(i, move |ctx: CancellationToken| async move {
                    tokio::select! {
                        _ = tokio::time::sleep(d) => Ok(()),
                        _ = ctx.cancelled() => Err(TaskError::Canceled),
                    }
                })
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn config_selects_the_strategy() {
        let bounded = TaskRunner::new(&RunnerConfig::bounded(2).unwrap()).unwrap();
        assert_eq!(
            bounded.mode(),
            RunnerMode::Bounded {
                limit: NonZeroUsize::new(2).unwrap()
            }
        );

        let unbounded = TaskRunner::new(&RunnerConfig::unbounded()).unwrap();
        assert_eq!(unbounded.mode(), RunnerMode::Unbounded);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let cfg = RunnerConfig::unbounded().with_timeout(Duration::ZERO);
        assert!(matches!(
            TaskRunner::new(&cfg),
            Err(RunnerError::Config(ConfigError::ZeroTimeout))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn serial_pool_takes_n_times_longer() {
        let d = Duration::from_millis(100);

        let serial = run_batch(sleepers(3, d), &RunnerConfig::bounded(1).unwrap())
            .await
            .unwrap();
        assert_eq!(serial.tasks_completed, 3);
        assert!(serial.wall_clock >= Duration::from_millis(300), "{:?}", serial.wall_clock);
        assert!(serial.wall_clock < Duration::from_millis(900), "{:?}", serial.wall_clock);

        let pooled = run_batch(sleepers(3, d), &RunnerConfig::bounded(3).unwrap())
            .await
            .unwrap();
        assert!(pooled.wall_clock >= d);
        assert!(pooled.wall_clock < Duration::from_millis(280), "{:?}", pooled.wall_clock);

        let unbounded = run_batch(sleepers(3, d), &RunnerConfig::unbounded())
            .await
            .unwrap();
        assert!(unbounded.wall_clock >= d);
        assert!(unbounded.wall_clock < Duration::from_millis(280), "{:?}", unbounded.wall_clock);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn per_task_timeout_from_config() {
        let cfg = RunnerConfig::bounded(2)
            .unwrap()
            .with_timeout(Duration::from_millis(30));
        let mut tasks = sleepers(2, Duration::from_millis(1));
        tasks.push(TaskFn::boxed(7, |_: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }));

        let report = run_batch(tasks, &cfg).await.unwrap();
        assert_eq!(report.tasks_completed, 2);
        assert_eq!(report.tasks_failed, 1);
        assert_eq!(report.tasks_timed_out, 1);
        assert!(report.wall_clock < Duration::from_secs(5));
    }

    #[test]
    fn blocking_entry_point_runs_outside_a_runtime() {
        let report = run_batch_blocking(
            sleepers(4, Duration::from_millis(5)),
            &RunnerConfig::bounded(2).unwrap(),
        )
        .unwrap();
        assert_eq!(report.tasks_completed, 4);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn blocking_entry_point_refuses_nested_runtime() {
        let res = run_batch_blocking(Vec::new(), &RunnerConfig::unbounded());
        assert!(matches!(res, Err(RunnerError::Runtime(_))));
    }

    #[test]
    fn outcome_sum_matches_submitted() {
        let tasks = (0..50u64)
            .map(|i| {
                TaskFn::boxed(i, move |_: CancellationToken| async move {
                    match i % 3 {
                        0 => Ok(()),
                        1 => Err(TaskError::fail("odd one out")),
                        _ => Err(TaskError::Canceled),
                    }
                })
            })
            .collect();
        let report = run_batch_blocking(tasks, &RunnerConfig::bounded(4).unwrap()).unwrap();

        assert_eq!(report.resolved(), report.tasks_submitted);
        assert_eq!(report.tasks_completed, 17);
        assert_eq!(report.tasks_failed, 17);
        assert_eq!(report.tasks_cancelled, 16);
        assert!(report.failures.iter().all(|f| f.id.get() % 3 == 1));
    }
}
