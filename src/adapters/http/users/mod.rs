//! HTTP adapter for user endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, UserResponse};
pub use handlers::UserHandlers;
pub use routes::user_routes;
