use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task failed: {reason}")]
    Fail { reason: String },
    #[error("task timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("task canceled")]
    Canceled,
}

impl TaskError {
    #[inline]
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }
}
