//! HTTP routes for user endpoints.

use axum::{routing::post, Router};

use super::handlers::{login, register, UserHandlers};

/// Creates the user router with all endpoints.
///
/// Both routes are public: registration and login happen before the
/// caller holds a token.
pub fn user_routes(handlers: UserHandlers) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(handlers)
}
