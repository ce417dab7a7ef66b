//! CreateRecordHandler - Command handler for creating data records.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::record::DataRecord;
use crate::ports::RecordRepository;

/// Command to create a data record.
#[derive(Debug, Clone)]
pub struct CreateRecordCommand {
    pub name: String,
    pub value: JsonValue,
    pub is_public: bool,
    pub created_by: UserId,
}

/// Result of successful record creation.
#[derive(Debug, Clone)]
pub struct CreateRecordResult {
    pub record: DataRecord,
}

/// Handler for creating data records.
///
/// Records are immutable once created, so nothing is cached or
/// invalidated here; the read path caches on demand.
pub struct CreateRecordHandler {
    records: Arc<dyn RecordRepository>,
}

impl CreateRecordHandler {
    pub fn new(records: Arc<dyn RecordRepository>) -> Self {
        Self { records }
    }

    pub async fn handle(&self, cmd: CreateRecordCommand) -> Result<CreateRecordResult, DomainError> {
        // 1. Create the aggregate from validated input
        let record = DataRecord::create(
            cmd.name,
            cmd.value,
            cmd.is_public,
            cmd.created_by,
            Timestamp::now(),
        )?;

        // 2. Persist
        self.records.save(&record).await?;

        info!(
            record_id = %record.id(),
            created_by = %record.created_by(),
            "Data created successfully"
        );

        Ok(CreateRecordResult { record })
    }
}
