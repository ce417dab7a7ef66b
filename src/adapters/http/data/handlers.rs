//! HTTP handlers for data record endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::record::{
    CreateRecordCommand, CreateRecordHandler, GetRecordHandler, GetRecordQuery,
    ListRecordsHandler, ListRecordsQuery,
};
use crate::domain::foundation::{DomainError, ErrorCode, RecordId};

use super::dto::{
    CreateRecordRequest, ErrorResponse, RecordDetailResponse, RecordListResponse, RecordResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct DataHandlers {
    create_handler: Arc<CreateRecordHandler>,
    get_handler: Arc<GetRecordHandler>,
    list_handler: Arc<ListRecordsHandler>,
}

impl DataHandlers {
    pub fn new(
        create_handler: Arc<CreateRecordHandler>,
        get_handler: Arc<GetRecordHandler>,
        list_handler: Arc<ListRecordsHandler>,
    ) -> Self {
        Self {
            create_handler,
            get_handler,
            list_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/data - Create a data record
pub async fn create_record(
    State(handlers): State<DataHandlers>,
    RequireAuth(claims): RequireAuth,
    Json(req): Json<CreateRecordRequest>,
) -> Response {
    let cmd = CreateRecordCommand {
        name: req.name,
        value: req.value,
        is_public: req.is_public,
        created_by: claims.user_id,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(RecordResponse::from(&result.record)),
        )
            .into_response(),
        Err(e) => handle_data_error(e),
    }
}

/// GET /api/data - List records visible to the caller
pub async fn list_records(
    State(handlers): State<DataHandlers>,
    RequireAuth(claims): RequireAuth,
) -> Response {
    let query = ListRecordsQuery {
        user_id: claims.user_id,
        role: claims.role,
    };

    match handlers.list_handler.handle(query).await {
        Ok(result) => {
            let records: Vec<RecordResponse> =
                result.records.iter().map(RecordResponse::from).collect();
            let response = RecordListResponse {
                count: records.len(),
                records,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_data_error(e),
    }
}

/// GET /api/data/:id - Read one record, cache first
pub async fn get_record(
    State(handlers): State<DataHandlers>,
    RequireAuth(claims): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let record_id = match id.parse::<RecordId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid record ID")),
            )
                .into_response()
        }
    };

    let query = GetRecordQuery {
        record_id,
        user_id: claims.user_id,
        role: claims.role,
    };

    match handlers.get_handler.handle(query).await {
        Ok(result) => {
            let response = RecordDetailResponse {
                record: RecordResponse::from(&result.record),
                from_cache: result.from_cache,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_data_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_data_error(error: DomainError) -> Response {
    match error.code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(error.message)),
        )
            .into_response(),
        ErrorCode::RecordNotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(error.message)),
        )
            .into_response(),
        ErrorCode::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden(error.message)),
        )
            .into_response(),
        _ => {
            tracing::error!(code = %error.code, message = %error.message, "Data request failed");
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
    fn data_error_not_found_maps_to_404() {
        let error = DomainError::new(ErrorCode::RecordNotFound, "Data not found");
        let response = handle_data_error(error);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn data_error_forbidden_maps_to_403() {
        let error = DomainError::new(ErrorCode::Forbidden, "Access denied");
        let response = handle_data_error(error);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn data_error_validation_maps_to_400() {
        let error = DomainError::new(ErrorCode::EmptyField, "name must not be empty");
        let response = handle_data_error(error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn data_error_cache_failure_maps_to_500() {
        let error = DomainError::new(ErrorCode::CacheError, "connection lost");
        let response = handle_data_error(error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
