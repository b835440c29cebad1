//! Observability seam for runners.
//!
//! Runners report lifecycle events to the [`Observer`]s they were given instead of writing to a
//! process-wide logger. Hooks are called from whatever execution context the event happens on
//! (runtime tasks, worker threads), so implementations must be cheap and thread-safe.

use std::sync::Arc;

use fanout_model::{BatchId, RunReport, RunnerMode, TaskId, TaskRecord};

/// Identity of the batch an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInfo {
    pub id: BatchId,
    pub mode: RunnerMode,
    pub submitted: usize,
}

impl BatchInfo {
    pub fn new(mode: RunnerMode, submitted: usize) -> Self {
        Self {
            id: BatchId::new(),
            mode,
            submitted,
        }
    }
}

pub trait Observer: Send + Sync {
    /// Called once before the first task is scheduled.
    fn on_batch_start(&self, _batch: &BatchInfo) {}

    /// Called when a task actually begins executing.
    fn on_task_start(&self, _batch: &BatchInfo, _id: TaskId) {}

    /// Called exactly once per submitted task, including tasks cancelled before they started.
    fn on_task_finish(&self, _batch: &BatchInfo, _record: &TaskRecord) {}

    /// Called once with the final report, after the barrier released.
    fn on_batch_finish(&self, _report: &RunReport) {}
}

pub type ObserverRef = Arc<dyn Observer>;

/// Fan-out list of observers; itself an [`Observer`].
#[derive(Clone, Default)]
pub struct Observers {
    inner: Vec<ObserverRef>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: ObserverRef) {
        self.inner.push(observer);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<Vec<ObserverRef>> for Observers {
    fn from(inner: Vec<ObserverRef>) -> Self {
        Self { inner }
    }
}

impl Observer for Observers {
    fn on_batch_start(&self, batch: &BatchInfo) {
        for o in &self.inner {
            o.on_batch_start(batch);
        }
    }

    fn on_task_start(&self, batch: &BatchInfo, id: TaskId) {
        for o in &self.inner {
            o.on_task_start(batch, id);
        }
    }

    fn on_task_finish(&self, batch: &BatchInfo, record: &TaskRecord) {
        for o in &self.inner {
            o.on_task_finish(batch, record);
        }
    }

    fn on_batch_finish(&self, report: &RunReport) {
        for o in &self.inner {
            o.on_batch_finish(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use fanout_model::ExecutionOutcome;

    #[derive(Default)]
    struct Counting {
        starts: AtomicUsize,
        finishes: AtomicUsize,
    }

    impl Observer for Counting {
        fn on_task_start(&self, _batch: &BatchInfo, _id: TaskId) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_task_finish(&self, _batch: &BatchInfo, _record: &TaskRecord) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn fans_out_to_every_observer() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let observers = Observers::from(vec![a.clone() as ObserverRef, b.clone() as ObserverRef]);
        assert_eq!(observers.len(), 2);

        let batch = BatchInfo::new(RunnerMode::Unbounded, 1);
        observers.on_batch_start(&batch);
        observers.on_task_start(&batch, TaskId::new(1));
        observers.on_task_finish(
            &batch,
            &TaskRecord::new(TaskId::new(1), ExecutionOutcome::Completed, Duration::ZERO),
        );

        for c in [&a, &b] {
            assert_eq!(c.starts.load(Ordering::SeqCst), 1);
            assert_eq!(c.finishes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn empty_list_is_a_noop() {
        let observers = Observers::new();
        assert!(observers.is_empty());
        observers.on_batch_start(&BatchInfo::new(RunnerMode::Unbounded, 0));
    }
}
