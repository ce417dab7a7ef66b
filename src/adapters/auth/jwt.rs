//! JWT implementation of the TokenService port.
//!
//! Tokens are HS256-signed with a shared secret and carry the account's
//! id, email, and role. Issuance and verification happen in the same
//! service, so no clock leeway is allowed when checking expiry.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::config::AuthConfig;
use crate::domain::foundation::{DomainError, ErrorCode, Role, UserId};
use crate::domain::user::User;
use crate::ports::{AuthClaims, TokenService};

/// Claims as serialized into the token.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    /// Subject - the user ID
    sub: String,
    email: String,
    role: String,
    /// Issued at (Unix epoch seconds)
    iat: i64,
    /// Expiry (Unix epoch seconds)
    exp: i64,
}

/// HS256 token service.
pub struct JwtTokenService {
    secret: SecretString,
    expiry: Duration,
}

impl JwtTokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: SecretString::new(config.jwt_secret.clone()),
            expiry: config.token_expiry(),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn validation() -> Validation {
        // Validation::default() is HS256, matching Header::default().
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

#[async_trait]
impl TokenService for JwtTokenService {
    async fn issue(&self, user: &User) -> Result<String, DomainError> {
        let now = chrono::Utc::now().timestamp();
        let claims = WireClaims {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_string(),
            iat: now,
            exp: now + self.expiry.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key()).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to sign token: {}", e),
            )
        })
    }

    async fn verify(&self, token: &str) -> Result<AuthClaims, DomainError> {
        let data = decode::<WireClaims>(token, &self.decoding_key(), &Self::validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        DomainError::new(ErrorCode::Unauthorized, "Token expired")
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        DomainError::new(ErrorCode::Unauthorized, "Invalid token")
                    }
                }
            })?;

        let claims = data.claims;
        let user_id = UserId::from_str(&claims.sub).map_err(|_| {
            tracing::warn!("Token subject is not a valid user id");
            DomainError::new(ErrorCode::Unauthorized, "Invalid token")
        })?;
        let role = Role::from_str(&claims.role).map_err(|_| {
            tracing::warn!(role = %claims.role, "Token carries an unknown role");
            DomainError::new(ErrorCode::Unauthorized, "Invalid token")
        })?;

        Ok(AuthClaims {
            user_id,
            email: claims.email,
            role,
        })
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn service_with_secret(secret: &str) -> JwtTokenService {
        JwtTokenService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            ..Default::default()
        })
    }

    fn test_user() -> User {
        User::register(
            "jane@example.com".to_string(),
            "Jane".to_string(),
            "$2b$04$fakefakefakefakefakefake".to_string(),
            Role::Admin,
            Timestamp::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn issue_then_verify_round_trips_claims() {
        let service = service_with_secret("test-signing-secret");
        let user = test_user();

        let token = service.issue(&user).await.unwrap();
        let claims = service.verify(&token).await.unwrap();

        assert_eq!(claims.user_id, user.id());
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn verify_rejects_token_signed_with_other_secret() {
        let issuer = service_with_secret("secret-one");
        let verifier = service_with_secret("secret-two");

        let token = issuer.issue(&test_user()).await.unwrap();
        let err = verifier.verify(&token).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let service = service_with_secret("test-signing-secret");
        let err = service.verify("definitely.not.a-jwt").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let service = service_with_secret("test-signing-secret");
        let now = chrono::Utc::now().timestamp();
        let claims = WireClaims {
            sub: UserId::new().to_string(),
            email: "old@example.com".to_string(),
            role: "user".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key()).unwrap();

        let err = service.verify(&token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(err.message.contains("expired"));
    }

    #[tokio::test]
    async fn verify_rejects_unknown_role() {
        let service = service_with_secret("test-signing-secret");
        let now = chrono::Utc::now().timestamp();
        let claims = WireClaims {
            sub: UserId::new().to_string(),
            email: "odd@example.com".to_string(),
            role: "superuser".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key()).unwrap();

        let err = service.verify(&token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn debug_does_not_leak_the_secret() {
        let service = service_with_secret("super-secret-value");
        let rendered = format!("{service:?}");
        assert!(!rendered.contains("super-secret-value"));
    }
}
