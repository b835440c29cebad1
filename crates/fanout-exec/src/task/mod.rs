mod fetch;
mod io;

pub use fetch::{Fetch, FetchRef, FetchTask};
pub use io::SimulatedIoTask;
