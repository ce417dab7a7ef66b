//! HTTP DTOs for admin endpoints.

use serde::Serialize;

use crate::adapters::http::users::UserResponse;

/// Full account listing for administrators.
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub count: usize,
}
