//! Error types for page retrieval.

use thiserror::Error;

/// Errors that can occur while retrieving a page.
///
/// Transient network conditions and 5xx responses are retried before
/// surfacing as [`FetchError::Unreachable`]; 4xx responses are permanent and
/// surface immediately as [`FetchError::Rejected`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be retrieved within the configured attempts
    /// (timeouts, connection failures, or persistent 5xx responses).
    #[error("unreachable after {attempts} attempts: {url}")]
    Unreachable {
        /// The URL that failed to download.
        url: String,
        /// Total attempts made, including the initial one.
        attempts: u32,
    },

    /// The server rejected the request with a client error status.
    #[error("HTTP {status} rejected {url}")]
    Rejected {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code (4xx).
        status: u16,
    },
}

impl FetchError {
    /// Creates an unreachable error.
    pub fn unreachable(url: impl Into<String>, attempts: u32) -> Self {
        Self::Unreachable {
            url: url.into(),
            attempts,
        }
    }

    /// Creates a rejected error.
    pub fn rejected(url: impl Into<String>, status: u16) -> Self {
        Self::Rejected {
            url: url.into(),
            status,
        }
    }
}
