//! Authentication configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration (JWT signing, password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// Bcrypt cost factor for password hashing
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Get token lifetime as Duration
    pub fn token_expiry(&self) -> Duration {
        Duration::from_secs(self.token_expiry_secs)
    }

    /// Validate authentication configuration
    ///
    /// In production, requires a signing secret of at least 32 bytes.
    /// In development, any non-empty secret is accepted.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("DATADOCK__AUTH__JWT_SECRET"));
        }
        if environment == Environment::Production && self.jwt_secret.len() < 32 {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if self.token_expiry_secs == 0 {
            return Err(ValidationError::InvalidTokenExpiry);
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ValidationError::InvalidBcryptCost);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

fn default_token_expiry() -> u64 {
    86_400
}

fn default_bcrypt_cost() -> u32 {
    12
}
