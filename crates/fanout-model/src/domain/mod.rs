mod task_id;
pub use task_id::TaskId;

mod batch_id;
pub use batch_id::BatchId;

mod outcome;
pub use outcome::{ExecutionOutcome, FailureReason};

mod record;
pub use record::{TaskFailure, TaskRecord};

mod report;
pub use report::RunReport;

/// Timeout value in milliseconds.
///
/// Used on the wire wherever a [`std::time::Duration`] is serialized.
pub type TimeoutMs = u64;
