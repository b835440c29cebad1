//! Logging for fanout binaries.
//!
//! [`init_logger`] installs the process-wide `tracing` subscriber, and [`TracingObserver`]
//! turns runner lifecycle events into log lines.

mod logger;
pub use logger::*;

mod observer;
pub use observer::TracingObserver;
