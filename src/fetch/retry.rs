//! Fixed-backoff retry policy for transient fetch failures.
//!
//! Failures are classified into [`FailureType`]: transient conditions
//! (network errors, 5xx) are retried a bounded number of times with a fixed
//! delay; permanent conditions (4xx) are never retried.

use std::time::Duration;

use tracing::debug;

/// Default maximum retry attempts after the initial request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default fixed backoff between attempts, in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: network timeout, connection reset, 5xx server errors.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, 403 Forbidden.
    Permanent,
}

/// Classifies an HTTP status code.
///
/// 5xx is transient; everything else non-2xx is permanent. 2xx never reaches
/// classification.
#[must_use]
pub fn classify_status(status: u16) -> FailureType {
    if (500..600).contains(&status) {
        FailureType::Transient
    } else {
        FailureType::Permanent
    }
}

/// Retry configuration: bounded attempts with a fixed delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with explicit retry count and backoff.
    #[must_use]
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Total attempts this policy makes, including the initial one.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Returns the delay before the next attempt, or `None` when the failure
    /// is permanent or attempts are exhausted.
    ///
    /// `attempt` is the 1-indexed attempt that just failed.
    #[must_use]
    pub fn next_delay(&self, failure: FailureType, attempt: u32) -> Option<Duration> {
        if failure == FailureType::Permanent {
            return None;
        }
        if attempt >= self.total_attempts() {
            debug!(attempt, max = self.total_attempts(), "attempts exhausted");
            return None;
        }
        Some(self.backoff)
    }
}
