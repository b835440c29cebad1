use std::sync::Arc;

use fanout_core::BoxTask;

use crate::{
    delay::DelayRef,
    task::{FetchRef, FetchTask, SimulatedIoTask},
};

/// `n` simulated I/O tasks with ids `0..n`, all sharing `delay`.
pub fn simulated_batch(n: u64, delay: DelayRef) -> Vec<BoxTask> {
    (0..n)
        .map(|id| Box::new(SimulatedIoTask::new(id, Arc::clone(&delay))) as BoxTask)
        .collect()
}

/// One fetch task per id, all sharing `fetcher`.
pub fn fetch_batch<I>(ids: I, fetcher: FetchRef) -> Vec<BoxTask>
where
    I: IntoIterator<Item = u64>,
{
    ids.into_iter()
        .map(|id| Box::new(FetchTask::new(id, Arc::clone(&fetcher))) as BoxTask)
        .collect()
}
