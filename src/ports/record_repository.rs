//! Data record repository port.
//!
//! Defines the contract for persisting and retrieving DataRecord
//! aggregates.
//!
//! # Design
//!
//! - **Visibility in the query**: `list_visible_to` pushes the
//!   public-or-owned filter into the store instead of filtering in memory
//! - **Admins unscoped**: an admin listing is every record

use crate::domain::foundation::{DomainError, RecordId, Role, UserId};
use crate::domain::record::DataRecord;
use async_trait::async_trait;

/// Repository port for DataRecord aggregate persistence.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Save a new record.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, record: &DataRecord) -> Result<(), DomainError>;

    /// Find a record by its ID.
    ///
    /// Returns `None` if not found. Visibility is the caller's concern.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<DataRecord>, DomainError>;

    /// List records the given user may see, newest first.
    ///
    /// Admins see everything; other roles see public records plus their
    /// own.
    async fn list_visible_to(
        &self,
        user_id: UserId,
        role: Role,
    ) -> Result<Vec<DataRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn record_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RecordRepository) {}
    }
}
