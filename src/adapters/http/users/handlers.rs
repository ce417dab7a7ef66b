//! HTTP handlers for user endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::user::{
    LoginUserCommand, LoginUserHandler, RegisterUserCommand, RegisterUserHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode};

use super::dto::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, UserResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct UserHandlers {
    register_handler: Arc<RegisterUserHandler>,
    login_handler: Arc<LoginUserHandler>,
}

impl UserHandlers {
    pub fn new(register_handler: Arc<RegisterUserHandler>, login_handler: Arc<LoginUserHandler>) -> Self {
        Self {
            register_handler,
            login_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/users/register - Register a new account
pub async fn register(
    State(handlers): State<UserHandlers>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let cmd = RegisterUserCommand {
        email: req.email,
        password: req.password,
        name: req.name,
        role: req.role,
    };

    match handlers.register_handler.handle(cmd).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(UserResponse::from(&result.user))).into_response()
        }
        Err(e) => handle_user_error(e),
    }
}

/// POST /api/users/login - Exchange credentials for a bearer token
pub async fn login(
    State(handlers): State<UserHandlers>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let cmd = LoginUserCommand {
        email: req.email,
        password: req.password,
    };

    match handlers.login_handler.handle(cmd).await {
        Ok(result) => {
            let response = LoginResponse {
                token: result.token,
                user: UserResponse::from(&result.user),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_user_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_user_error(error: DomainError) -> Response {
    match error.code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(error.message)),
        )
            .into_response(),
        ErrorCode::DuplicateEmail => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(error.message)),
        )
            .into_response(),
        ErrorCode::InvalidCredentials | ErrorCode::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized(error.message)),
        )
            .into_response(),
        ErrorCode::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden(error.message)),
        )
            .into_response(),
        _ => {
            tracing::error!(code = %error.code, message = %error.message, "User request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("An unexpected error occurred")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_validation_maps_to_400() {
        let error = DomainError::new(ErrorCode::EmptyField, "name must not be empty");
        let response = handle_user_error(error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn user_error_duplicate_email_maps_to_409() {
        let error = DomainError::new(ErrorCode::DuplicateEmail, "User already exists");
        let response = handle_user_error(error);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn user_error_invalid_credentials_maps_to_401() {
        let error = DomainError::new(ErrorCode::InvalidCredentials, "Invalid credentials");
        let response = handle_user_error(error);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn user_error_database_failure_maps_to_500() {
        let error = DomainError::new(ErrorCode::DatabaseError, "connection refused");
        let response = handle_user_error(error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
