mod error;
pub use error::ConfigError;

use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};

use crate::RunnerMode;

/// Environment variable holding the concurrency limit (`0`, empty or `unbounded` means no limit).
pub const ENV_CONCURRENCY: &str = "FANOUT_CONCURRENCY";
/// Environment variable holding the per-task timeout in milliseconds.
pub const ENV_TASK_TIMEOUT_MS: &str = "FANOUT_TASK_TIMEOUT_MS";

/// Configuration a runner is constructed from.
///
/// An absent `concurrency_limit` selects the unbounded runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Maximum number of tasks executing at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<NonZeroUsize>,

    /// Deadline for each individual task; a task still running past it is recorded as timed out.
    #[serde(
        default,
        rename = "perTaskTimeoutMs",
        with = "crate::serde_ms::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub per_task_timeout: Option<Duration>,
}

impl RunnerConfig {
    /// Unbounded config without a timeout.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounded config from a raw integer, rejecting zero.
    pub fn bounded(limit: usize) -> Result<Self, ConfigError> {
        let limit = NonZeroUsize::new(limit).ok_or(ConfigError::ZeroConcurrency)?;
        Ok(Self {
            concurrency_limit: Some(limit),
            per_task_timeout: None,
        })
    }

    pub fn with_limit(mut self, limit: NonZeroUsize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_task_timeout = Some(timeout);
        self
    }

    /// Scheduling strategy this config selects.
    pub fn mode(&self) -> RunnerMode {
        match self.concurrency_limit {
            Some(limit) => RunnerMode::Bounded { limit },
            None => RunnerMode::Unbounded,
        }
    }

    /// Check invariants that the types alone do not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_task_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Build a config from [`ENV_CONCURRENCY`] and [`ENV_TASK_TIMEOUT_MS`].
    ///
    /// Unset variables keep the defaults (unbounded, no timeout).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            let norm = raw.trim().to_ascii_lowercase();
            cfg.concurrency_limit = match norm.as_str() {
                "" | "0" | "unbounded" => None,
                n => {
                    let n: usize = n.parse().map_err(|_| ConfigError::InvalidValue {
                        key: ENV_CONCURRENCY,
                        value: raw.clone(),
                    })?;
                    NonZeroUsize::new(n)
                }
            };
        }

        if let Some(raw) = lookup(ENV_TASK_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TASK_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            cfg.per_task_timeout = Some(Duration::from_millis(ms));
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
