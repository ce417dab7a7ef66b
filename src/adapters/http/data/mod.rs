//! HTTP adapter for data record endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateRecordRequest, ErrorResponse, RecordDetailResponse, RecordListResponse, RecordResponse,
};
pub use handlers::DataHandlers;
pub use routes::data_routes;
