//! Prometheus metrics for fanout batch runners.
//!
//! This crate provides [`PrometheusObserver`], a [`fanout_core::Observer`] that records runner
//! events into its own [`Registry`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fanout_core::ObserverRef;
//! use fanout_prometheus::PrometheusObserver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = Arc::new(PrometheusObserver::new()?);
//!
//! // Hand it to a runner via `with_observer`.
//! let observer: ObserverRef = metrics.clone();
//! # drop(observer);
//!
//! // Expose the text format from your own /metrics handler.
//! let body = metrics.encode_text()?;
//! assert!(body.is_empty() || body.contains("fanout_"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `fanout_batches_total{mode}` - Counter
//! - `fanout_tasks_started_total{mode}` - Counter
//! - `fanout_tasks_finished_total{mode, outcome}` - Counter
//! - `fanout_tasks_in_flight{mode}` - Gauge
//! - `fanout_task_duration_seconds{mode}` - Histogram
//! - `fanout_batch_duration_seconds{mode}` - Histogram
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for the `/metrics` endpoint.
//! Serve [`PrometheusObserver::gather`] or [`PrometheusObserver::encode_text`] from the
//! application's existing HTTP framework.

mod backend;
pub use backend::PrometheusObserver;

pub use prometheus::{Encoder, Registry, TextEncoder};
