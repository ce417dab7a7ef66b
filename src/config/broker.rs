//! Message broker configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::retry::RetryConfig;

/// Message broker configuration (Redis Streams)
///
/// The broker may point at the same Redis instance as the cache or a
/// dedicated one; the two clients hold independent connections either way.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Broker connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Queue name for user registration events
    #[serde(default = "default_registration_queue")]
    pub registration_queue: String,

    /// Consumer group shared by worker instances
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,

    /// Consumer name within the group (unique per worker instance)
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// How long a consume poll blocks waiting for a delivery, in milliseconds
    #[serde(default = "default_block_timeout_ms")]
    pub block_timeout_ms: u64,

    /// Reconnection retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

impl BrokerConfig {
    /// Get the connection timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the consume block timeout as Duration
    pub fn block_timeout(&self) -> Duration {
        Duration::from_millis(self.block_timeout_ms)
    }

    /// Validate broker configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATADOCK__BROKER__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.registration_queue.is_empty() {
            return Err(ValidationError::EmptyQueueName);
        }
        if self.consumer_group.is_empty() || self.consumer_name.is_empty() {
            return Err(ValidationError::EmptyConsumerIdentity);
        }
        self.retry.validate()?;
        Ok(())
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            registration_queue: default_registration_queue(),
            consumer_group: default_consumer_group(),
            consumer_name: default_consumer_name(),
            block_timeout_ms: default_block_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_registration_queue() -> String {
    "user_registered".to_string()
}

fn default_consumer_group() -> String {
    "datadock-workers".to_string()
}

fn default_consumer_name() -> String {
    "worker-1".to_string()
}

fn default_block_timeout_ms() -> u64 {
    5000
}
