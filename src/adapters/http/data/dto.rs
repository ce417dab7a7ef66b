//! HTTP DTOs for data record endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;
use crate::domain::record::DataRecord;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a data record. The value is any JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    pub name: String,
    pub value: JsonValue,
    /// Defaults to private when omitted.
    #[serde(default)]
    pub is_public: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A data record as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub name: String,
    pub value: JsonValue,
    pub is_public: bool,
    pub created_by: String,
    pub created_at: Timestamp,
}

impl From<&DataRecord> for RecordResponse {
    fn from(record: &DataRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            value: record.value().clone(),
            is_public: record.is_public(),
            created_by: record.created_by().to_string(),
            created_at: record.created_at(),
        }
    }
}

/// A single record read, with its cache provenance.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetailResponse {
    #[serde(flatten)]
    pub record: RecordResponse,
    /// True when the cache answered instead of the store.
    pub from_cache: bool,
}

/// List of records visible to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RecordListResponse {
    pub records: Vec<RecordResponse>,
    pub count: usize,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "FORBIDDEN".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::foundation::UserId;

    fn test_record() -> DataRecord {
        DataRecord::create(
            "sensor-1".to_string(),
            json!(42),
            true,
            UserId::new(),
            Timestamp::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_record_request_defaults_to_private() {
        let json = r#"{"name": "sensor-1", "value": "42"}"#;
        let req: CreateRecordRequest = serde_json::from_str(json).unwrap();
        assert!(!req.is_public);
    }

    #[test]
    fn create_record_request_accepts_is_public() {
        let json = r#"{"name": "sensor-1", "value": "42", "is_public": true}"#;
        let req: CreateRecordRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_public);
    }

    #[test]
    fn create_record_request_keeps_structured_values() {
        let json = r#"{"name": "sensor-1", "value": {"reading": 21.5}}"#;
        let req: CreateRecordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.value["reading"], 21.5);
    }

    #[test]
    fn record_detail_response_flattens_the_record() {
        let record = test_record();
        let response = RecordDetailResponse {
            record: RecordResponse::from(&record),
            from_cache: true,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["name"], "sensor-1");
        assert_eq!(json["from_cache"], true);
        // Flattened, not nested under a "record" key
        assert!(json.get("record").is_none());
    }

    #[test]
    fn record_list_response_serializes_count() {
        let record = test_record();
        let response = RecordListResponse {
            records: vec![RecordResponse::from(&record)],
            count: 1,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["records"][0]["value"], 42);
    }
}
