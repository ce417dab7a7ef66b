//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.
//! `api_router` assembles them: user routes stay public, data and admin
//! routes sit behind the bearer-token middleware, and `/health` bypasses
//! auth entirely.

pub mod admin;
pub mod data;
pub mod health;
pub mod middleware;
pub mod users;

pub use admin::{admin_routes, AdminHandlers};
pub use data::{data_routes, DataHandlers};
pub use health::{health_routes, HealthState};
pub use middleware::{auth_middleware, AuthState, RequireAdmin, RequireAuth};
pub use users::{user_routes, UserHandlers};

use axum::{middleware::from_fn_with_state, Router};
use tower_http::trace::TraceLayer;

/// Assembles the full API router.
pub fn api_router(
    users: UserHandlers,
    data: DataHandlers,
    admin: AdminHandlers,
    health: HealthState,
    auth: AuthState,
) -> Router {
    let protected = Router::new()
        .nest("/api/data", data_routes(data))
        .nest("/api/admin", admin_routes(admin))
        .layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .nest("/api/users", user_routes(users))
        .merge(protected)
        .merge(health_routes(health))
        .layer(TraceLayer::new_for_http())
}
