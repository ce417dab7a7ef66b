//! Bearer-token middleware and the route-level auth extractors.
//!
//! `auth_middleware` verifies the `Authorization: Bearer` header through the
//! `TokenService` port and stashes the resulting [`AuthClaims`] in request
//! extensions. It does not itself reject missing tokens; handlers opt in to
//! enforcement by taking [`RequireAuth`] (any verified caller) or
//! [`RequireAdmin`] (verified and admin) as an argument. A token that is
//! present but fails verification is rejected immediately with 401, before
//! any handler runs.

use async_trait::async_trait;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::ports::{AuthClaims, TokenService};

/// State handed to `auth_middleware` by the router.
pub type AuthState = Arc<dyn TokenService>;

/// Verifies the bearer token, if one was sent, and forwards the request.
///
/// Requests without an `Authorization` header pass through untouched so
/// that `RequireAuth` can produce the uniform "authentication required"
/// answer instead of the middleware guessing at one.
pub async fn auth_middleware(
    State(tokens): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match tokens.verify(token).await {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
                next.run(request).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({
                        "error": e.message,
                        "code": "AUTH_ERROR"
                    })),
                )
                    .into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor for handlers that need a verified caller.
///
/// Rejects with 401 when the middleware put no claims in the extensions.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthClaims);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthClaims>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for admin-only handlers.
///
/// Rejects with 401 when unauthenticated and 403 when the caller is
/// authenticated but not an admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthClaims);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<AuthClaims>()
            .cloned()
            .ok_or(AuthRejection::Unauthenticated)?;

        if !claims.role.is_admin() {
            return Err(AuthRejection::Forbidden);
        }

        Ok(RequireAdmin(claims))
    }
}

/// Why an extractor turned the request away.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required",
                "UNAUTHENTICATED",
            ),
            AuthRejection::Forbidden => {
                (StatusCode::FORBIDDEN, "Admin access required", "FORBIDDEN")
            }
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}
