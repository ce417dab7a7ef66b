//! Axum middleware layers.

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAdmin, RequireAuth};
