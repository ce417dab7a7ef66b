//! Reconnection retry policy configuration
//!
//! Shared by the cache and broker sections. Each connection-holding client
//! gets its own copy so the two backends can be tuned independently
//! (`DATADOCK__REDIS__RETRY__*` vs `DATADOCK__BROKER__RETRY__*`).

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Exponential backoff retry policy for reconnection
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum reconnection attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts in milliseconds (doubled each attempt)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on the computed delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// Get base delay as Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Get delay cap as Duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Validate retry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidRetryPolicy);
        }
        if self.base_delay_ms == 0 || self.base_delay_ms > self.max_delay_ms {
            return Err(ValidationError::InvalidRetryPolicy);
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    5000
}

fn default_max_delay_ms() -> u64 {
    60_000
}
