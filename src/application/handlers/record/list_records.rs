//! ListRecordsHandler - Query handler for the record listing.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Role, UserId};
use crate::domain::record::DataRecord;
use crate::ports::RecordRepository;

/// Query for the records visible to an account.
#[derive(Debug, Clone)]
pub struct ListRecordsQuery {
    pub user_id: UserId,
    pub role: Role,
}

/// Result of the record listing.
#[derive(Debug, Clone)]
pub struct ListRecordsResult {
    pub records: Vec<DataRecord>,
}

/// Handler for listing records.
///
/// The visibility filter lives in the repository query, so this handler
/// is pass-through: admins get everything, everyone else gets public
/// records plus their own.
pub struct ListRecordsHandler {
    records: Arc<dyn RecordRepository>,
}

impl ListRecordsHandler {
    pub fn new(records: Arc<dyn RecordRepository>) -> Self {
        Self { records }
    }

    pub async fn handle(&self, query: ListRecordsQuery) -> Result<ListRecordsResult, DomainError> {
        let records = self.records.list_visible_to(query.user_id, query.role).await?;
        Ok(ListRecordsResult { records })
    }
}
