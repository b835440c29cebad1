use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,
    #[error("per-task timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
