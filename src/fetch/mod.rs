//! Page retrieval with bounded timeout and fixed-backoff retry.
//!
//! [`PageFetcher::fetch`] issues a bounded-timeout GET and retries transient
//! failures (network errors, 5xx) up to [`DEFAULT_MAX_RETRIES`] additional
//! times with a fixed delay. Client errors (4xx) are never retried. Any 2xx
//! response yields a [`RawPage`], even with an empty body.

mod client;
mod error;
mod retry;

pub use client::{DEFAULT_TIMEOUT_SECS, HttpClient};
pub use error::FetchError;
pub use retry::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_RETRIES, FailureType, RetryPolicy, classify_status};

use std::time::SystemTime;

use reqwest::header::USER_AGENT;
use tracing::{debug, instrument, warn};

/// A fetched page, consumed by the extractor and discarded.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The URL the page was fetched from.
    pub url: String,
    /// The HTTP status code (always 2xx).
    pub status: u16,
    /// The response body, possibly empty.
    pub body: String,
    /// When the fetch completed.
    pub fetched_at: SystemTime,
}

/// Retrieves raw markup for URLs with retry on transient failures.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: HttpClient,
    retry: RetryPolicy,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(HttpClient::new(), RetryPolicy::default())
    }
}

impl PageFetcher {
    /// Creates a fetcher with the given client and retry policy.
    #[must_use]
    pub fn new(client: HttpClient, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// The client used for requests (shared with the policy checker).
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetches `url`, identifying as `agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Rejected`] for 4xx responses (no retry) and
    /// [`FetchError::Unreachable`] when transient failures persist through
    /// every attempt. Malformed bodies are not errors: any 2xx response
    /// produces a `RawPage`.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str, agent: &str) -> Result<RawPage, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match self.attempt(url, agent).await {
                Ok(page) => {
                    debug!(status = page.status, bytes = page.body.len(), "fetched");
                    return Ok(page);
                }
                Err(AttemptError::Status(status)) => {
                    let failure = classify_status(status);
                    if failure == FailureType::Permanent {
                        return Err(FetchError::rejected(url, status));
                    }
                    warn!(status, attempt, "server error; will retry if attempts remain");
                    failure
                }
                Err(AttemptError::Network(e)) => {
                    warn!(error = %e, attempt, "network error; will retry if attempts remain");
                    FailureType::Transient
                }
            };
            match self.retry.next_delay(failure, attempt) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(FetchError::unreachable(url, attempt)),
            }
        }
    }

    /// One request/response cycle, with status and body handling.
    async fn attempt(&self, url: &str, agent: &str) -> Result<RawPage, AttemptError> {
        let response = self
            .client
            .inner()
            .get(url)
            .header(USER_AGENT, agent)
            .send()
            .await
            .map_err(AttemptError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }
        // Body read failures (truncation, timeout mid-stream) are network
        // conditions, not malformed-body errors.
        let body = response.text().await.map_err(AttemptError::Network)?;
        Ok(RawPage {
            url: url.to_string(),
            status: status.as_u16(),
            body,
            fetched_at: SystemTime::now(),
        })
    }
}

/// Internal per-attempt failure, classified by the retry loop.
#[derive(Debug)]
enum AttemptError {
    Network(reqwest::Error),
    Status(u16),
}
