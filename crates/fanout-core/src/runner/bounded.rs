use std::{
    io,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, SendError, Sender};
use fanout_model::{ExecutionOutcome, FailureReason, RunReport, RunnerMode, TaskRecord};
use tokio::{runtime::Handle, sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace, warn};

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

const TARGET: &str = "fanout.core.bounded";

struct Job {
    task: BoxTask,
    ctx: CancellationToken,
    batch: Arc<Batch>,
    report: mpsc::UnboundedSender<TaskRecord>,
}

/// Fixed pool of `limit` persistent OS worker threads fed from one queue.
///
/// Each worker runs one task at a time and blocks its thread until the task resolves, so at most
/// `limit` tasks are ever in flight. Workers are spawned when the runner is built and retired at
/// the end of [`BoundedRunner::run`]; dropping an unused runner lets them exit on their own.
///
/// Dropping the `run` future before it resolves cancels the batch: queued tasks are skipped and
/// running ones are interrupted.
pub struct BoundedRunner {
    limit: NonZeroUsize,
    jobs: Sender<Job>,
    workers: Vec<thread::JoinHandle<()>>,
    settings: Settings,
}

impl BoundedRunner {
    /// Spawn `limit` workers bound to the current tokio runtime.
    ///
    /// Fails with [`RunnerError::SchedulerExhaustion`] if the OS refuses a thread; workers spawned
    /// before the failure are shut down again.
    pub fn new(limit: NonZeroUsize) -> Result<Self, RunnerError> {
        let handle = Handle::try_current().map_err(|e| RunnerError::Runtime(e.to_string()))?;
        Self::with_handle(limit, handle)
    }

    pub fn with_handle(limit: NonZeroUsize, handle: Handle) -> Result<Self, RunnerError> {
        Self::start(limit, handle, |n, work| {
            thread::Builder::new()
                .name(format!("fanout-worker-{n}"))
                .spawn(work)
        })
    }

    fn start<S>(limit: NonZeroUsize, handle: Handle, mut spawn: S) -> Result<Self, RunnerError>
    where
        S: FnMut(usize, Box<dyn FnOnce() + Send>) -> io::Result<thread::JoinHandle<()>>,
    {
        let (jobs, rx) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(limit.get());

        for n in 0..limit.get() {
            let rx = rx.clone();
            let handle = handle.clone();
            match spawn(n, Box::new(move || worker_loop(n, rx, handle))) {
                Ok(worker) => workers.push(worker),
                Err(source) => {
                    error!(target: TARGET, spawned = n, requested = limit.get(), error = %source, "worker spawn failed");
                    drop(jobs);
                    for w in workers {
                        let _ = w.join();
                    }
                    return Err(RunnerError::SchedulerExhaustion {
                        spawned: n,
                        requested: limit.get(),
                        source,
                    });
                }
            }
        }

        debug!(target: TARGET, workers = limit.get(), "worker pool ready");
        Ok(Self {
            limit,
            jobs,
            workers,
            settings: Settings::default(),
        })
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

    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }

    pub fn mode(&self) -> RunnerMode {
        RunnerMode::Bounded { limit: self.limit }
    }

    /// Queue every task, wait for all of them, then retire the workers.
    #[instrument(level = "debug", name = "bounded", skip_all, fields(tasks = tasks.len(), limit = self.limit.get()))]
    pub async fn run(self, tasks: Vec<BoxTask>) -> RunReport {
        let mode = self.mode();
        let Self {
            jobs,
            workers,
            settings,
            ..
        } = self;
        let started = Instant::now();

        // Scoped to this run so an early drop does not fire the caller's token.
        let scope = settings.cancel.child_token();
        let guard = scope.clone().drop_guard();

        let batch = Arc::new(Batch {
            info: BatchInfo::new(mode, tasks.len()),
            timeout: settings.timeout,
            observers: settings.observers,
        });
        batch.observers.on_batch_start(&batch.info);

        let mut agg = ReportAggregator::new(&batch.info);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for task in tasks {
            let job = Job {
                task,
                ctx: scope.child_token(),
                batch: Arc::clone(&batch),
                report: tx.clone(),
            };
            if let Err(SendError(job)) = jobs.send(job) {
                let record = TaskRecord::unstarted(
                    job.task.id(),
                    ExecutionOutcome::failed("worker pool is gone"),
                );
                batch.observers.on_task_finish(&batch.info, &record);
                agg.record(&record);
            }
        }
        // Closing the queue lets workers exit once it is drained.
        drop(jobs);
        drop(tx);

        while let Some(record) = rx.recv().await {
            agg.record(&record);
        }
        guard.disarm();

        let retired = tokio::task::spawn_blocking(move || {
            let mut retired = 0usize;
            for w in workers {
                if w.join().is_ok() {
                    retired += 1;
                }
            }
            retired
        })
        .await;
        trace!(target: TARGET, batch = %batch.info.id, ?retired, "workers retired");

        let report = agg.finish(started.elapsed());
        batch.observers.on_batch_finish(&report);
        report
    }
}

fn worker_loop(n: usize, rx: Receiver<Job>, handle: Handle) {
    trace!(target: TARGET, worker = n, "worker started");
    while let Ok(job) = rx.recv() {
        run_job(&handle, job);
    }
    trace!(target: TARGET, worker = n, "worker stopped");
}

fn run_job(handle: &Handle, job: Job) {
    let Job {
        task,
        ctx,
        batch,
        report,
    } = job;
    let id = task.id();

    // Blocks this worker thread until the task resolves.
    let run = panic::catch_unwind(AssertUnwindSafe(|| {
        handle.block_on(execute(task.as_ref(), &ctx, &batch))
    }));
    let record = match run {
        Ok(record) => record,
        // Task panics are caught inside `execute`; this one came from an observer hook, so the
        // observers are not called again.
        Err(payload) => {
            let reason = panic_message(&*payload);
            warn!(target: TARGET, %id, %reason, "observer panicked");
            TaskRecord::new(
                id,
                ExecutionOutcome::Failed(FailureReason::Panicked(reason)),
                Duration::ZERO,
            )
        }
    };
    let _ = report.send(record);
}
