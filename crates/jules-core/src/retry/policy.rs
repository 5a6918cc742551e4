use std::time::Duration;

use crate::retry::error::ApiError;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Capped exponential backoff with additive jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on the exponential part of the delay.
    pub max_delay: Duration,
    /// Jitter is drawn from `[0, jitter)` and added on top of the capped delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_retries(2)
    }
}

impl RetryPolicy {
    /// Policy allowing `max_retries` retries after the first attempt.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_attempts: max_retries.saturating_add(1),
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            jitter: Duration::from_millis(100),
        }
    }

    /// Capped exponential part of the delay: `min(max, base * 2^(attempt-1))`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }

    /// Decide whether the failed `attempt` (1-based) should be retried.
    ///
    /// `seed` drives the jitter so callers can keep the decision deterministic.
    pub fn decide(&self, attempt: u32, error: &ApiError, seed: u64) -> RetryDecision {
        if attempt >= self.max_attempts || !error.retryable() {
            return RetryDecision::NoRetry;
        }
        let jitter_ms = jitter_ms(attempt, seed, self.jitter.as_millis() as u64);
        RetryDecision::RetryAfter(self.backoff(attempt) + Duration::from_millis(jitter_ms))
    }
}

/// Pseudo-random value in `[0, bound)` derived from `(attempt, seed)`.
pub fn jitter_ms(attempt: u32, seed: u64, bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let mut x = seed ^ ((attempt as u64) << 32) ^ 0x9E37_79B9_7F4A_7C15;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D) % bound
}
