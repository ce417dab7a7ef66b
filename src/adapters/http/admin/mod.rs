//! HTTP adapter for admin endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::UserListResponse;
pub use handlers::AdminHandlers;
pub use routes::admin_routes;
