//! TokenService port - Interface for issuing and verifying auth tokens.
//!
//! The HTTP layer depends on this port for bearer-token auth; the signing
//! scheme and expiry policy live in the adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Role, UserId};
use crate::domain::user::User;

/// Identity claims carried inside a verified token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl AuthClaims {
    /// Builds claims for an account.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id(),
            email: user.email().to_string(),
            role: user.role(),
        }
    }
}

/// Port for bearer-token issuance and verification.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a signed token for an account.
    async fn issue(&self, user: &User) -> Result<String, DomainError>;

    /// Verify a token and extract its claims.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for expired, malformed, or wrongly signed tokens
    async fn verify(&self, token: &str) -> Result<AuthClaims, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn token_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn TokenService) {}
    }
}
