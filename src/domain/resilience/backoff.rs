//! Exponential backoff policy for reconnection retries.

use std::time::Duration;

/// Exponential backoff policy with a delay cap and an attempt budget.
///
/// The delay before retry `attempt` (counting from 0) is
/// `min(base_delay * 2^attempt, max_delay)`.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Maximum number of failed attempts tolerated before giving up.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Upper bound on the computed delay.
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Creates a new backoff policy.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Computes the delay before the given retry attempt (0-based).
    ///
    /// Doubles the base delay per attempt, saturating at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;

        let exponential = if attempt >= 64 {
            u64::MAX
        } else {
            2u64.saturating_pow(attempt)
        };
        let delay_ms = base_ms.saturating_mul(exponential).min(max_ms);

        Duration::from_millis(delay_ms)
    }

    /// Returns true once the failed-attempt count has passed the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts > self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(5000),
            max_delay: Duration::from_millis(60_000),
        }
    }
}
