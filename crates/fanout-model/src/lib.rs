//! Shared data types for batch execution.
//!
//! Everything a caller hands to a runner or gets back from one lives here:
//! - [`TaskId`] / [`BatchId`] identifiers
//! - [`ExecutionOutcome`] and [`FailureReason`], produced once per task
//! - [`RunReport`], the aggregate of one batch
//! - [`RunnerConfig`] and the [`RunnerMode`] derived from it

mod config;
pub use config::{ConfigError, ENV_CONCURRENCY, ENV_TASK_TIMEOUT_MS, RunnerConfig};

mod domain;
pub use domain::*;

mod kind;
pub use kind::RunnerMode;

mod serde_ms;
