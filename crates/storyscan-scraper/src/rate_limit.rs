//! Rate limiting and retry utilities for the story client.
//!
//! Two separate controls live here:
//!
//! - [`retry_with_backoff`] retries one fetch on transient transport errors
//!   (429, timeouts, connection failures, 5xx) with jittered exponential
//!   backoff. Definitive answers (404, other 4xx, bad JSON) are returned
//!   immediately.
//! - [`Pacing`] is the politeness delay applied between identifiers by the
//!   batch processor.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

const MAX_BACKOFF_MS: u64 = 60_000;

/// Returns `true` if `err` represents a transient condition worth retrying.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ScraperError::Deserialize { .. }
        | ScraperError::NotFound { .. }
        | ScraperError::InvalidEndpoint { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` capped at 60 s,
/// scaled by a random factor in `[0.75, 1.25)`. A `RateLimited` error's
/// `Retry-After` value is honored when present and longer than the computed
/// delay; without one the computed delay is used as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10))
                    .min(MAX_BACKOFF_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = match &err {
                    ScraperError::RateLimited {
                        retry_after_secs: Some(secs),
                    } if backoff_base_ms > 0 => {
                        jittered.max(secs.saturating_mul(1000).min(MAX_BACKOFF_MS))
                    }
                    _ => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Uniformly random delay window applied between consecutive identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min_ms: u64,
    max_ms: u64,
}

impl Pacing {
    /// Builds a window; bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    #[must_use]
    pub fn from_config(config: &storyscan_core::AppConfig) -> Self {
        Self::new(config.pacing_min_ms, config.pacing_max_ms)
    }

    /// Draws the next delay from `[min_ms, max_ms]`.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleeps for one drawn delay.
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
