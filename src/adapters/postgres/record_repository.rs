//! PostgreSQL implementation of RecordRepository.
//!
//! Persists DataRecord rows and applies the visibility rule in SQL for
//! listings, so private records never leave the database for the wrong
//! caller.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, RecordId, Role, Timestamp, UserId};
use crate::domain::record::DataRecord;
use crate::ports::RecordRepository;

/// PostgreSQL implementation of RecordRepository.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
}

impl PostgresRecordRepository {
    /// Creates a new PostgresRecordRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn save(&self, record: &DataRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO data_records (
                id, name, value, is_public, created_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.name())
        .bind(record.value().to_string())
        .bind(record.is_public())
        .bind(record.created_by().as_uuid())
        .bind(record.created_at().as_datetime())
        .bind(record.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert record: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<DataRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, value, is_public, created_by, created_at, updated_at
            FROM data_records
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch record: {}", e),
            )
        })?;

        row.map(row_to_record).transpose()
    }

    async fn list_visible_to(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<Vec<DataRecord>, DomainError> {
        let rows = if role.is_admin() {
            sqlx::query(
                r#"
                SELECT id, name, value, is_public, created_by, created_at, updated_at
                FROM data_records
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                r#"
                SELECT id, name, value, is_public, created_by, created_at, updated_at
                FROM data_records
                WHERE is_public = TRUE OR created_by = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list records: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_record).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<DataRecord, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Failed to get id: {}", e))
    })?;

    let name: String = row.try_get("name").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get name: {}", e),
        )
    })?;

    let raw_value: String = row.try_get("value").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get value: {}", e),
        )
    })?;
    // The column holds serialized JSON; anything else comes back as a bare string.
    let value = serde_json::from_str(&raw_value).unwrap_or(JsonValue::String(raw_value));

    let is_public: bool = row.try_get("is_public").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get is_public: {}", e),
        )
    })?;

    let created_by: uuid::Uuid = row.try_get("created_by").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get created_by: {}", e),
        )
    })?;

    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get created_at: {}", e),
        )
    })?;

    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get updated_at: {}", e),
        )
    })?;

    Ok(DataRecord::from_storage(
        RecordId::from_uuid(id),
        name,
        value,
        is_public,
        UserId::from_uuid(created_by),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
