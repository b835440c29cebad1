mod config;
mod error;
mod format;
mod log;

pub use config::{ENV_LOG, ENV_LOG_FORMAT, LoggerConfig};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global subscriber described by `cfg`.
///
/// Only the first successful call in a process takes effect; later calls return
/// [`LoggerError::AlreadyInitialized`].
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}
