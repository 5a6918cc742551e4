//! Retry loop: run an async attempt until success or the policy says stop.

use std::future::Future;

use super::error::ApiError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::time::Sleeper;

/// Runs `attempt_fn` until it succeeds or the retry policy says to stop.
///
/// The closure receives the 1-based attempt number. Attempts are strictly
/// sequential; on a retryable failure the loop sleeps for the backoff before
/// the next one. The last error is returned unchanged.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    seed: u64,
    mut attempt_fn: F,
) -> Result<T, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1u32;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt, &e, seed) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        attempt,
                        kind = %e.kind(),
                        status = ?e.status(),
                        delay_ms = delay.as_millis() as u64,
                        "retrying: {}",
                        e.message()
                    );
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}
