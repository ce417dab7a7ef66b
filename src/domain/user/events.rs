//! User domain events.
//!
//! Events published when account lifecycle changes occur:
//! - `UserRegistered` - New account created

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, Role, Timestamp, UserId};

use super::User;

// ════════════════════════════════════════════════════════════════════════════
// UserRegistered
// ════════════════════════════════════════════════════════════════════════════

/// Published when a new account is registered.
///
/// Downstream consumers use this to trigger the welcome email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistered {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// ID of the new account.
    pub user_id: UserId,

    /// Registered email address (already normalized).
    pub email: String,

    /// Display name.
    pub name: String,

    /// Role assigned at registration.
    pub role: Role,

    /// When the registration occurred.
    pub registered_at: Timestamp,
}

domain_event!(
    UserRegistered,
    event_type = "user.registered.v1",
    schema_version = 1,
    entity_id = user_id,
    occurred_at = registered_at,
    event_id = event_id
);

impl UserRegistered {
    /// Builds the event from a freshly registered account.
    pub fn from_user(user: &User) -> Self {
        Self {
            event_id: EventId::new(),
            user_id: user.id(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            role: user.role(),
            registered_at: user.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainEvent;

    fn test_user() -> User {
        User::register(
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "$2b$12$hash".to_string(),
            Role::User,
            Timestamp::from_unix_secs(1704326400),
        )
        .unwrap()
    }

    #[test]
    fn test_user_registered_event_type() {
        let event = UserRegistered::from_user(&test_user());
        assert_eq!(event.event_type(), "user.registered.v1");
        assert_eq!(event.schema_version(), 1);
    }

    #[test]
    fn test_user_registered_entity_id_is_user_id() {
        let user = test_user();
        let event = UserRegistered::from_user(&user);
        assert_eq!(event.entity_id(), user.id().to_string());
    }

    #[test]
    fn test_user_registered_carries_account_fields() {
        let user = test_user();
        let event = UserRegistered::from_user(&user);
        assert_eq!(event.email, "alice@example.com");
        assert_eq!(event.name, "Alice");
        assert_eq!(event.role, Role::User);
        assert_eq!(event.registered_at, user.created_at());
    }
}
