//! Retry with exponential backoff for provider calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::MetadataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
    /// or `max_attempts` is used up. The last error is returned as is.
    pub async fn run<T, F, Fut, R>(
        &self,
        label: &str,
        is_retryable: R,
        mut op: F,
    ) -> Result<T, MetadataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MetadataError>>,
        R: Fn(&MetadataError) -> bool,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        request = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "provider request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Classify a transport-level failure.
pub fn classify_transport(e: &reqwest::Error) -> MetadataError {
    if e.is_decode() {
        MetadataError::Permanent(format!("malformed response: {e}"))
    } else if e.is_builder() {
        MetadataError::Permanent(format!("invalid request: {e}"))
    } else if let Some(status) = e.status() {
        classify_status(status)
    } else {
        // timeouts, refused or reset connections, DNS failures
        MetadataError::Transient(e.to_string())
    }
}

/// Classify a non-success HTTP status.
pub fn classify_status(status: reqwest::StatusCode) -> MetadataError {
    if status == reqwest::StatusCode::NOT_FOUND {
        MetadataError::NotFound
    } else if status.is_server_error() {
        MetadataError::Transient(format!("upstream returned {status}"))
    } else {
        MetadataError::Permanent(format!("upstream returned {status}"))
    }
}
