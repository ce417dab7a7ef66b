//! HTTP handlers for admin endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::users::{ErrorResponse, UserResponse};
use crate::application::handlers::user::{ListUsersHandler, ListUsersQuery};
use crate::domain::foundation::{DomainError, ErrorCode};

use super::dto::UserListResponse;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AdminHandlers {
    list_users_handler: Arc<ListUsersHandler>,
}

impl AdminHandlers {
    pub fn new(list_users_handler: Arc<ListUsersHandler>) -> Self {
        Self { list_users_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/users - List every account
pub async fn list_users(
    State(handlers): State<AdminHandlers>,
    RequireAdmin(claims): RequireAdmin,
) -> Response {
    let query = ListUsersQuery { role: claims.role };

    match handlers.list_users_handler.handle(query).await {
        Ok(result) => {
            let users: Vec<UserResponse> = result.users.iter().map(UserResponse::from).collect();
            let response = UserListResponse {
                count: users.len(),
                users,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_admin_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_admin_error(error: DomainError) -> Response {
    match error.code {
        ErrorCode::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden(error.message)),
        )
            .into_response(),
        _ => {
            tracing::error!(code = %error.code, message = %error.message, "Admin request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("An unexpected error occurred")),
            )
                .into_response()
        }
    }
}
