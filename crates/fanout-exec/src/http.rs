use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::trace;

use crate::{error::FetchError, task::Fetch};

/// Resource endpoint the fetch demo talks to; the id is appended verbatim.
pub const DEFAULT_BASE_URL: &str = "http://localhost/api/v2/pokemon/";

/// [`Fetch`] over plain HTTP GET.
///
/// One client is shared by every task so connections are pooled. Retries and response parsing
/// are left to the caller.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, id: u64) -> String {
        format!("{}{}", self.base_url, id)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, id: u64) -> Result<String, FetchError> {
        let url = self.url(id);
        trace!(target: "fanout.exec.http", %url, "GET");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound { id }),
            status if !status.is_success() => Err(FetchError::Status {
                id,
                status: status.as_u16(),
            }),
            _ => Ok(response.text().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_appends_id() {
        let f = HttpFetcher::new("http://example.test/pokemon/");
        assert_eq!(f.url(25), "http://example.test/pokemon/25");
        assert_eq!(HttpFetcher::default().url(1), format!("{DEFAULT_BASE_URL}1"));
    }

    #[tokio::test]
    async fn connection_errors_surface_as_fetch_errors() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let f = HttpFetcher::new("http://127.0.0.1:9/");
        let err = f.fetch(1).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }
}
