use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    fmt::time::OffsetTime,
    layer::{Layered, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type Filtered = Layered<EnvFilter, Registry>;

/// Build the filter, pick the output layer for `cfg.format` and install the pair globally.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = cfg.filter()?;
    let registry: Filtered = tracing_subscriber::registry().with(filter);

    match cfg.format {
        LoggerFormat::Text => registry.with(text_layer::<Filtered>(cfg)).try_init(),
        LoggerFormat::Json => registry.with(json_layer::<Filtered>(cfg)).try_init(),
        LoggerFormat::Journald => return journald(registry),
    }
    .map_err(classify)
}

/// Runner diagnostics only make sense with the carrier visible, so both fmt layers honour
/// `with_thread_names` (worker threads are named `fanout-worker-N`).
fn text_layer<S>(cfg: &LoggerConfig) -> impl Layer<S> + Send + Sync + use<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_thread_names(cfg.with_thread_names)
        .with_timer(local_rfc3339())
}

fn json_layer<S>(cfg: &LoggerConfig) -> impl Layer<S> + Send + Sync + use<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_current_span(true)
        .with_target(cfg.with_targets)
        .with_thread_names(cfg.with_thread_names)
        .with_timer(local_rfc3339())
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

/// `try_init` sets both the `tracing` dispatcher and the `log` bridge; either one being taken
/// means somebody else installed a logger first.
fn classify(e: impl std::fmt::Display) -> LoggerError {
    let msg = e.to_string();
    if msg.contains("already") {
        LoggerError::AlreadyInitialized
    } else {
        LoggerError::InitializationFailed(msg)
    }
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald<S>(registry: S) -> Result<(), LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync + 'static,
{
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?
        .with_syslog_identifier("fanout".to_string());
    registry.with(layer).try_init().map_err(classify)
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald<S>(_registry: S) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}
