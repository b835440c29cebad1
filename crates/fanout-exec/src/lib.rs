//! Concrete tasks for the batch runners.
//!
//! - [`SimulatedIoTask`] blocks on an injectable [`Delay`](delay::Delay);
//! - [`FetchTask`] calls a [`Fetch`] collaborator, e.g. [`HttpFetcher`] (feature `http`).

mod error;
pub use error::FetchError;

pub mod delay;
pub use delay::{Delay, DelayRef, FixedDelay, NoDelay, SteppedDelay};

mod task;
pub use task::{Fetch, FetchRef, FetchTask, SimulatedIoTask};

mod batch;
pub use batch::{fetch_batch, simulated_batch};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{DEFAULT_BASE_URL, HttpFetcher};

pub mod prelude {
    pub use crate::{Delay, Fetch, FetchTask, FixedDelay, SimulatedIoTask, fetch_batch, simulated_batch};
    pub use crate::error::FetchError;
}
