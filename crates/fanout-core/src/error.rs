use fanout_model::ConfigError;
use thiserror::Error;

/// Errors surfaced when constructing a runner.
///
/// Once a runner exists, task failures are recorded in the report and never become a `RunnerError`.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("could not spawn worker {spawned} of {requested}: {source}")]
    SchedulerExhaustion {
        spawned: usize,
        requested: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("async runtime unavailable: {0}")]
    Runtime(String),
    #[error("invalid runner config: {0}")]
    Config(#[from] ConfigError),
}
