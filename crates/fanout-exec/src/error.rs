use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("resource {id} not found")]
    NotFound { id: u64 },
    #[error("unexpected status {status} for resource {id}")]
    Status { id: u64, status: u16 },
    #[cfg(feature = "http")]
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fetch failed: {0}")]
    Other(String),
}
