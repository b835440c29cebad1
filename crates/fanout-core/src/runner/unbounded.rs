use std::{collections::HashMap, sync::Arc, time::Duration};

use fanout_model::{ExecutionOutcome, FailureReason, RunReport, RunnerMode, TaskRecord};
use tokio::{runtime::Handle, task::JoinSet, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::{
    Settings,
    execute::{Batch, execute, panic_message},
};
use crate::{
    error::RunnerError,
    observer::{BatchInfo, Observer, ObserverRef},
    report::ReportAggregator,
    task::BoxTask,
};

/// One runtime task per submitted task, no cap on how many are live.
///
/// Tasks blocked in I/O are suspended futures; the runtime multiplexes them onto its own worker
/// threads, so thousands of sleeping tasks cost no OS threads.
pub struct UnboundedRunner {
    handle: Handle,
    settings: Settings,
}

impl UnboundedRunner {
    /// Bind the runner to the current tokio runtime.
    pub fn new() -> Result<Self, RunnerError> {
        let handle = Handle::try_current().map_err(|e| RunnerError::Runtime(e.to_string()))?;
        Ok(Self::with_handle(handle))
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            settings: Settings::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn with_observer(mut self, observer: ObserverRef) -> Self {
        self.settings.observers.push(observer);
        self
    }

    /// Use `token` to cancel the batch instead of a private one.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.settings.cancel = token;
        self
    }

    /// Token that cancels the whole batch when fired.
    pub fn cancel_token(&self) -> CancellationToken {
        self.settings.cancel.clone()
    }

    pub fn mode(&self) -> RunnerMode {
        RunnerMode::Unbounded
    }

    /// Run every task concurrently and wait for all of them.
    #[instrument(level = "debug", name = "unbounded", skip_all, fields(tasks = tasks.len()))]
    pub async fn run(self, tasks: Vec<BoxTask>) -> RunReport {
        let Self { handle, settings } = self;
        let started = Instant::now();

        let batch = Arc::new(Batch {
            info: BatchInfo::new(RunnerMode::Unbounded, tasks.len()),
            timeout: settings.timeout,
            observers: settings.observers,
        });
        batch.observers.on_batch_start(&batch.info);
        debug!(target: "fanout.core.unbounded", batch = %batch.info.id, "spawning one context per task");

        let mut agg = ReportAggregator::new(&batch.info);
        let mut set = JoinSet::new();
        let mut ids = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let id = task.id();
            let ctx = settings.cancel.child_token();
            let batch = Arc::clone(&batch);
            let abort = set.spawn_on(
                async move { execute(task.as_ref(), &ctx, &batch).await },
                &handle,
            );
            ids.insert(abort.id(), id);
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(record) => agg.record(&record),
                Err(err) => {
                    let Some(id) = ids.get(&err.id()).copied() else {
                        warn!(target: "fanout.core.unbounded", error = %err, "unknown task context failed");
                        continue;
                    };
                    // Task panics are caught inside `execute`, so a panicking join means an
                    // observer hook panicked and the observers are not called again.
                    let record = if err.is_panic() {
                        let reason = panic_message(&*err.into_panic());
                        warn!(target: "fanout.core.unbounded", %id, %reason, "observer panicked");
                        TaskRecord::new(
                            id,
                            ExecutionOutcome::Failed(FailureReason::Panicked(reason)),
                            Duration::ZERO,
                        )
                    } else {
                        let record = TaskRecord::unstarted(id, ExecutionOutcome::Cancelled);
                        batch.observers.on_task_finish(&batch.info, &record);
                        record
                    };
                    agg.record(&record);
                }
            }
        }

        let report = agg.finish(started.elapsed());
        batch.observers.on_batch_finish(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_util::sync::CancellationToken;

    use crate::task::{TaskError, TaskFn};

    fn sleeper(id: u64, d: Duration) -> BoxTask {
        TaskFn::boxed(id, move |ctx: CancellationToken| async move {
            tokio::select! {
                _ = tokio::time::sleep(d) => Ok(()),
                _ = ctx.cancelled() => Err(TaskError::Canceled),
            }
        })
    }

    #[test]
    fn needs_a_runtime() {
        assert!(matches!(UnboundedRunner::new(), Err(RunnerError::Runtime(_))));
    }

    #[tokio::test]
    async fn empty_batch_reports_zero() {
        let report = UnboundedRunner::new().unwrap().run(Vec::new()).await;
        assert_eq!(report.tasks_submitted, 0);
        assert_eq!(report.resolved(), 0);
        assert!(report.is_clean());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn thousand_sleepers_finish_in_about_one_sleep() {
        let d = Duration::from_millis(100);
        let tasks = (0..1000).map(|i| sleeper(i, d)).collect();

        let report = UnboundedRunner::new().unwrap().run(tasks).await;

        assert_eq!(report.tasks_completed, 1000);
        assert!(report.wall_clock >= d);
        assert!(
            report.wall_clock < Duration::from_secs(2),
            "took {:?}",
            report.wall_clock
        );
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let tasks = (1..=10)
            .map(|i| {
                TaskFn::boxed(i, move |_: CancellationToken| async move {
                    if i == 5 {
                        Err(TaskError::fail("task 5 always fails"))
                    } else {
                        Ok(())
                    }
                })
            })
            .collect();

        let report = UnboundedRunner::new().unwrap().run(tasks).await;
        assert_eq!(report.tasks_completed, 9);
        assert_eq!(report.tasks_failed, 1);
        assert_eq!(report.tasks_cancelled, 0);
        assert_eq!(report.failures[0].id.get(), 5);
    }

    #[tokio::test]
    async fn cancelling_the_token_cancels_in_flight_tasks() {
        let runner = UnboundedRunner::new().unwrap();
        let token = runner.cancel_token();
        let tasks = (0..20).map(|i| sleeper(i, Duration::from_secs(30))).collect();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
        let report = runner.run(tasks).await;

        assert_eq!(report.tasks_cancelled, 20);
        assert_eq!(report.resolved(), 20);
        assert!(report.wall_clock < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn observers_see_every_task() {
        #[derive(Default)]
        struct Count(AtomicUsize, AtomicUsize);
        impl Observer for Count {
            fn on_task_start(&self, _: &BatchInfo, _: fanout_model::TaskId) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn on_task_finish(&self, _: &BatchInfo, _: &TaskRecord) {
                self.1.fetch_add(1, Ordering::SeqCst);
            }
        }

        let count = Arc::new(Count::default());
        let tasks = (0..7).map(|i| sleeper(i, Duration::from_millis(1))).collect();
        UnboundedRunner::new()
            .unwrap()
            .with_observer(count.clone())
            .run(tasks)
            .await;

        assert_eq!(count.0.load(Ordering::SeqCst), 7);
        assert_eq!(count.1.load(Ordering::SeqCst), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn per_task_timeout_fails_only_slow_tasks() {
        let mut tasks: Vec<BoxTask> = (0..4).map(|i| sleeper(i, Duration::from_millis(5))).collect();
        tasks.push(TaskFn::boxed(9, |_: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }));

        let report = UnboundedRunner::new()
            .unwrap()
            .with_timeout(Duration::from_millis(40))
            .run(tasks)
            .await;

        assert_eq!(report.tasks_completed, 4);
        assert_eq!(report.tasks_failed, 1);
        assert_eq!(report.tasks_timed_out, 1);
        assert_eq!(report.failures[0].id, fanout_model::TaskId::new(9));
        assert_eq!(report.failures[0].reason, FailureReason::Timeout { timeout_ms: 40 });
        assert!(report.wall_clock < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_observer_is_notified_once_per_task() {
        struct PanicsOnFinish(AtomicUsize);
        impl Observer for PanicsOnFinish {
            fn on_task_finish(&self, _: &BatchInfo, _: &TaskRecord) {
                self.0.fetch_add(1, Ordering::SeqCst);
                panic!("observer failed");
            }
        }

        let obs = Arc::new(PanicsOnFinish(AtomicUsize::new(0)));
        let tasks = (0..4).map(|i| sleeper(i, Duration::from_millis(1))).collect();
        let report = UnboundedRunner::new()
            .unwrap()
            .with_observer(obs.clone())
            .run(tasks)
            .await;

        assert_eq!(obs.0.load(Ordering::SeqCst), 4);
        assert_eq!(report.tasks_failed, 4);
        assert_eq!(report.resolved(), 4);
    }
}
