//! Request spacing and retry utilities.
//!
//! [`Throttle`] enforces one global minimum gap between outbound requests,
//! no matter how many tasks share it. [`retry_with_backoff`] retries
//! transient failures (429 responses, transport errors); everything else is
//! returned to the caller on the first attempt.

use std::future::Future;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::ScraperError;

/// Process-wide minimum spacing between requests.
///
/// Backed by a single-cell GCRA limiter: the first request passes
/// immediately, each later one waits until `min_spacing` has elapsed since
/// the previous slot. A zero spacing disables throttling.
pub struct Throttle {
    limiter: Option<DefaultDirectRateLimiter>,
    min_spacing: Duration,
}

impl Throttle {
    #[must_use]
    pub fn new(min_spacing: Duration) -> Self {
        let limiter = Quota::with_period(min_spacing).map(RateLimiter::direct);
        Self {
            limiter,
            min_spacing,
        }
    }

    #[must_use]
    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// Waits until the next request slot is available.
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("min_spacing", &self.min_spacing)
            .finish_non_exhaustive()
    }
}

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429, the server asked us to back off.
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout, etc.).
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts. With
/// `max_retries = 0` the operation runs exactly once.
///
/// Non-retriable errors are returned immediately without sleeping or retrying.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
