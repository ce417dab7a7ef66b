//! HTTP routes for data record endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_record, get_record, list_records, DataHandlers};

/// Creates the data router with all endpoints.
///
/// Every route expects the auth middleware to have run; handlers enforce
/// it through the `RequireAuth` extractor.
pub fn data_routes(handlers: DataHandlers) -> Router {
    Router::new()
        .route("/", post(create_record))
        .route("/", get(list_records))
        .route("/:id", get(get_record))
        .with_state(handlers)
}
