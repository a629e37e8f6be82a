//! # Bondlist Ext HTTP
//!
//! [`HttpFetcher`]: a `reqwest` client behind the
//! [`DocumentFetcher`](bondlist_traits::DocumentFetcher) seam.
//!
//! One attempt per request. Non-2xx responses are errors. Bodies are decoded with the
//! charset the server declares, falling back to the request's charset (the exchange
//! listing and the statistics pages are served as windows-1251).

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use bondlist_traits::{DocumentFetcher, FetchError, FetchRequest, FetchResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("bondlist/", env!("CARGO_PKG_VERSION"));

/// Fetches documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default settings.
    pub fn new() -> FetchResult<Self> {
        Self::builder().build()
    }

    /// Starts a builder.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpFetcherBuilder {
    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> FetchResult<HttpFetcher> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(|e| FetchError::transport("<client>", e))?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        debug!(url = %request.url, charset = request.charset, "fetching");

        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .text_with_charset(request.charset)
            .await
            .map_err(|e| FetchError::transport(&request.url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = HttpFetcher::builder();
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
        assert!(builder.user_agent.starts_with("bondlist/"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let fetcher = HttpFetcher::builder()
            .with_timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let err = fetcher
            .fetch(&FetchRequest::new("http://127.0.0.1:9/unreachable"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.url(), "http://127.0.0.1:9/unreachable");
    }
}
