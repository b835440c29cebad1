use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TimeoutMs;

/// Terminal result of one task. Every submitted task produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum ExecutionOutcome {
    /// The unit of work returned successfully.
    Completed,
    /// The unit of work errored, panicked or ran past its timeout.
    Failed(FailureReason),
    /// The batch was cancelled before or while the task ran.
    Cancelled,
}

impl ExecutionOutcome {
    #[inline]
    pub fn failed(reason: impl Into<String>) -> Self {
        ExecutionOutcome::Failed(FailureReason::Task(reason.into()))
    }

    #[inline]
    pub fn timed_out(timeout_ms: TimeoutMs) -> Self {
        ExecutionOutcome::Failed(FailureReason::Timeout { timeout_ms })
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed(_))
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionOutcome::Cancelled)
    }

    /// Returns a short symbolic label, intended for logs and metric labels:
    /// - `"completed"`
    /// - `"failed"`, `"timeout"`, `"panicked"` (split by failure reason)
    /// - `"cancelled"`
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionOutcome::Completed => "completed",
            ExecutionOutcome::Failed(reason) => reason.label(),
            ExecutionOutcome::Cancelled => "cancelled",
        }
    }
}

/// Why a task ended up [`ExecutionOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    tag = "kind",
    content = "detail"
)]
pub enum FailureReason {
    /// The unit of work itself returned an error.
    Task(String),
    /// The task was still running when its per-task timeout expired.
    Timeout { timeout_ms: TimeoutMs },
    /// The unit of work panicked; the payload message is kept when it was a string.
    Panicked(String),
}

impl FailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::Task(_) => "failed",
            FailureReason::Timeout { .. } => "timeout",
            FailureReason::Panicked(_) => "panicked",
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, FailureReason::Timeout { .. })
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Task(reason) => write!(f, "{reason}"),
            FailureReason::Timeout { timeout_ms } => write!(f, "timed out after {timeout_ms}ms"),
            FailureReason::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_split_failures() {
        assert_eq!(ExecutionOutcome::Completed.label(), "completed");
        assert_eq!(ExecutionOutcome::failed("boom").label(), "failed");
        assert_eq!(ExecutionOutcome::timed_out(50).label(), "timeout");
        assert_eq!(
            ExecutionOutcome::Failed(FailureReason::Panicked("x".into())).label(),
            "panicked"
        );
        assert_eq!(ExecutionOutcome::Cancelled.label(), "cancelled");
    }

    #[test]
    fn predicates() {
        assert!(ExecutionOutcome::Completed.is_completed());
        assert!(ExecutionOutcome::timed_out(1).is_failed());
        assert!(ExecutionOutcome::Cancelled.is_cancelled());
        assert!(!ExecutionOutcome::Cancelled.is_failed());
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(ExecutionOutcome::Completed).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));

        let json = serde_json::to_value(ExecutionOutcome::timed_out(250)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "failed",
                "reason": { "kind": "timeout", "detail": { "timeoutMs": 250 } }
            })
        );
    }

    #[test]
    fn display_reason() {
        assert_eq!(FailureReason::Task("boom".into()).to_string(), "boom");
        assert_eq!(
            FailureReason::Timeout { timeout_ms: 10 }.to_string(),
            "timed out after 10ms"
        );
    }
}
