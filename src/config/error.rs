//! Errors raised while loading and validating configuration.
//!
//! Both kinds abort startup. The messages are written for the operator
//! reading a crash log, so they name the knob to fix rather than the code
//! path that noticed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    Invalid(#[from] ValidationError),
}

/// A setting that parsed fine but cannot be run with.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required and was not set")]
    MissingRequired(&'static str),

    #[error("server port must not be 0")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database URL must use a postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("Redis URL must use a redis:// or rediss:// scheme")]
    InvalidRedisUrl,

    #[error("pool min_connections must not exceed max_connections")]
    InvalidPoolSize,

    #[error("pool max_connections must not exceed 100")]
    PoolSizeTooLarge,

    #[error("retry policy needs max_attempts > 0 and 0 < base_delay <= max_delay")]
    InvalidRetryPolicy,

    #[error("queue name must not be empty")]
    EmptyQueueName,

    #[error("consumer group and consumer name must not be empty")]
    EmptyConsumerIdentity,

    #[error("JWT secret must be at least 32 bytes in production")]
    JwtSecretTooShort,

    #[error("token expiry must be greater than zero")]
    InvalidTokenExpiry,

    #[error("bcrypt cost must be between 4 and 31")]
    InvalidBcryptCost,
}
