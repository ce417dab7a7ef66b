//! Data record aggregate: user-owned key/value entries with a public flag.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{RecordId, Role, Timestamp, UserId, ValidationError};

/// A stored data entry owned by the user who created it.
///
/// The value is free-form JSON: clients store anything from a bare string
/// to a nested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    id: RecordId,
    name: String,
    value: JsonValue,
    is_public: bool,
    created_by: UserId,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl DataRecord {
    /// Creates a new record from validated input.
    pub fn create(
        name: String,
        value: JsonValue,
        is_public: bool,
        created_by: UserId,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if value.is_null() {
            return Err(ValidationError::empty_field("value"));
        }

        Ok(Self {
            id: RecordId::new(),
            name,
            value,
            is_public,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Rebuilds a record from stored fields without re-validating.
    pub fn from_storage(
        id: RecordId,
        name: String,
        value: JsonValue,
        is_public: bool,
        created_by: UserId,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            value,
            is_public,
            created_by,
            created_at,
            updated_at,
        }
    }

    /// Visibility rule: public records are open to everyone, private
    /// records only to their owner and admins.
    pub fn is_visible_to(&self, user_id: UserId, role: Role) -> bool {
        self.is_public || self.created_by == user_id || role.is_admin()
    }

    // Getters
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
