//! Typed configuration for both binaries.
//!
//! Everything comes from the environment (plus a `.env` file in
//! development), under the `DATADOCK` prefix with `__` separating nesting
//! levels: `DATADOCK__SERVER__PORT`, `DATADOCK__REDIS__RETRY__MAX_ATTEMPTS`,
//! and so on. Loading only deserializes; call [`AppConfig::validate`] before
//! serving traffic so a bad value fails startup instead of a request.
//!
//! ```no_run
//! use datadock::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod auth;
mod broker;
mod database;
mod error;
mod redis;
mod retry;
mod server;

pub use auth::AuthConfig;
pub use broker::BrokerConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use retry::RetryConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Every section the two services read.
///
/// The API service uses all of it; the worker ignores `server` beyond the
/// log level. Sections without a `serde(default)` have at least one field
/// that must be set explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub broker: BrokerConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Reads the environment (and `.env`, if present) into a typed config.
    ///
    /// Fails when a required variable is missing or a value does not parse
    /// as its field's type. Semantic checks live in [`validate`], not here.
    ///
    /// [`validate`]: AppConfig::validate
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DATADOCK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Runs every section's semantic checks: URL schemes, pool bounds,
    /// retry policy coherence, and the production-only secret rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.broker.validate()?;
        self.auth.validate(self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Process environment is global state; serialize the tests that touch it.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const REQUIRED: &[(&str, &str)] = &[
        ("DATADOCK__DATABASE__URL", "postgresql://test@localhost/test"),
        ("DATADOCK__REDIS__URL", "redis://localhost:6379"),
        ("DATADOCK__BROKER__URL", "redis://localhost:6379"),
        ("DATADOCK__AUTH__JWT_SECRET", "test-secret-key"),
    ];

    const OPTIONAL_KEYS: &[&str] = &[
        "DATADOCK__SERVER__PORT",
        "DATADOCK__SERVER__ENVIRONMENT",
        "DATADOCK__BROKER__REGISTRATION_QUEUE",
        "DATADOCK__REDIS__RETRY__MAX_ATTEMPTS",
    ];

    /// Loads a config from the required variables plus the given overrides,
    /// leaving the process environment clean afterwards.
    fn load_with(overrides: &[(&str, &str)]) -> AppConfig {
        let _guard = ENV_MUTEX.lock().unwrap();
        for (key, value) in REQUIRED.iter().chain(overrides) {
            env::set_var(key, value);
        }

        let result = AppConfig::load();

        for (key, _) in REQUIRED {
            env::remove_var(key);
        }
        for key in OPTIONAL_KEYS {
            env::remove_var(key);
        }
        result.expect("config should load")
    }

    #[test]
    fn loads_the_required_urls_from_the_environment() {
        let config = load_with(&[]);

        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.broker.url, "redis://localhost:6379");
    }

    #[test]
    fn a_minimal_environment_passes_validation() {
        assert!(load_with(&[]).validate().is_ok());
    }

    #[test]
    fn unset_sections_fall_back_to_their_defaults() {
        let config = load_with(&[]);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.broker.registration_queue, "user_registered");
        assert_eq!(config.broker.consumer_group, "datadock-workers");
        assert_eq!(config.broker.retry.max_attempts, 10);
    }

    #[test]
    fn production_flag_follows_the_environment_variable() {
        let config = load_with(&[("DATADOCK__SERVER__ENVIRONMENT", "production")]);
        assert!(config.is_production());
    }

    #[test]
    fn overrides_reach_their_nested_fields() {
        let config = load_with(&[
            ("DATADOCK__SERVER__PORT", "8080"),
            ("DATADOCK__BROKER__REGISTRATION_QUEUE", "signup_events"),
        ]);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.broker.registration_queue, "signup_events");
    }

    #[test]
    fn a_deep_retry_override_touches_only_its_section() {
        let config = load_with(&[("DATADOCK__REDIS__RETRY__MAX_ATTEMPTS", "3")]);

        assert_eq!(config.redis.retry.max_attempts, 3);
        assert_eq!(config.broker.retry.max_attempts, 10);
    }
}
