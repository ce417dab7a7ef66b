//! Bcrypt implementation of the PasswordHasher port.
//!
//! Hashing at production cost takes on the order of 100ms, so both
//! operations run on the blocking thread pool to keep the async runtime
//! responsive.

use async_trait::async_trait;

use crate::config::AuthConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PasswordHasher;

/// Password hasher backed by the bcrypt KDF.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            cost: config.bcrypt_cost,
        }
    }

    /// For tests: a cheap cost factor so hashing stays fast.
    #[cfg(test)]
    fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, raw: &str) -> Result<String, DomainError> {
        let cost = self.cost;
        let raw = raw.to_string();
        tokio::task::spawn_blocking(move || bcrypt::hash(raw, cost))
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Hashing task failed: {}", e),
                )
            })?
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to hash password: {}", e),
                )
            })
    }

    async fn verify(&self, raw: &str, hash: &str) -> Result<bool, DomainError> {
        let raw = raw.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(raw, &hash))
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Verification task failed: {}", e),
                )
            })?
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to verify password: {}", e),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct horse battery").await.unwrap();

        assert!(hasher.verify("correct horse battery", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn verify_returns_false_for_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("right-password").await.unwrap();

        assert!(!hasher.verify("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same-password").await.unwrap();
        let second = hasher.hash("same-password").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn verify_errors_on_malformed_hash() {
        let hasher = fast_hasher();
        let result = hasher.verify("password", "not-a-bcrypt-hash").await;

        assert_eq!(result.unwrap_err().code, ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn cost_comes_from_config() {
        let config = AuthConfig {
            jwt_secret: "secret".to_string(),
            bcrypt_cost: 4,
            ..Default::default()
        };
        let hasher = BcryptPasswordHasher::new(&config);
        let hash = hasher.hash("pw").await.unwrap();

        // Bcrypt hashes embed the cost as "$2b$<cost>$".
        assert!(hash.starts_with("$2b$04$"), "unexpected hash: {hash}");
    }
}
