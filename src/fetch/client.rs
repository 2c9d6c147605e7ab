//! HTTP client wrapper with bounded timeouts.
//!
//! The client is built once with the crawl timeout and the project
//! User-Agent and reused for every request, taking advantage of connection
//! pooling. Per-target agents override the default via request headers.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent;

/// Default total timeout for a single page retrieval, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for page and robots.txt retrieval.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default 10 second timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with an explicit total request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Access to the underlying reqwest client for request building.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
