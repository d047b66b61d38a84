//! Generic retry wrapper for remote calls that can degrade instead of fail.
//!
//! A call is retried both when it errors outright and when it succeeds with
//! the fallback marker set: a placeholder answer is not acceptable while
//! attempts remain. On the final attempt a degraded result is accepted and
//! returned with its marker intact, so downstream consumers can surface it.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::clock::Clock;
use crate::content::FallbackFlagged;

use super::GenerationError;

/// Bounded-attempt exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Backoff before `attempt` (1-based): nothing before the first attempt,
    /// then `base_delay`, `2x`, `4x`, `8x`, ...
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay.saturating_mul(1 << (attempt - 2).min(31))
    }
}

/// Run `call` until it produces an acceptable result or attempts run out.
///
/// `on_retry(attempt, max_attempts)` fires before every attempt after the
/// first, ahead of its backoff wait, so callers can show retry feedback.
///
/// # Errors
///
/// Returns the last hard failure once every attempt has errored. A response
/// that is merely fallback-flagged is never turned into an error.
pub async fn with_retry<T, C, F, Fut>(
    clock: &C,
    policy: &RetryPolicy,
    mut call: F,
    mut on_retry: impl FnMut(u32, u32),
) -> Result<T, GenerationError>
where
    T: FallbackFlagged,
    C: Clock + ?Sized,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if attempt > 1 {
            on_retry(attempt, max_attempts);
            clock.sleep(policy.delay_before(attempt)).await;
        }
        match call(attempt).await {
            Ok(result) => {
                if !result.is_fallback() {
                    return Ok(result);
                }
                if attempt >= max_attempts {
                    debug!("accepting fallback-flagged result after {attempt} attempts");
                    return Ok(result);
                }
                debug!("fallback-flagged result on attempt {attempt}, retrying");
            }
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                debug!("attempt {attempt} failed, retrying: {err}");
            }
        }
        attempt += 1;
    }
}
