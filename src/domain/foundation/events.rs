//! The event contract shared by the API service and the worker.
//!
//! Everything that crosses the queue travels as an [`EventEnvelope`]: a
//! JSON payload plus the routing fields consumers key on. Concrete events
//! implement [`DomainEvent`] (usually through [`domain_event!`]) so the
//! envelope can be lifted off them without per-event glue code.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

/// What an event must expose for the envelope to carry it.
pub trait DomainEvent: Send + Sync {
    /// Routing key, with a trailing version segment ("user.registered.v1").
    fn event_type(&self) -> &'static str;

    /// Payload schema version; agrees with the `event_type` suffix.
    fn schema_version(&self) -> u32;

    /// The entity this event is about, as a string key.
    fn entity_id(&self) -> String;

    fn occurred_at(&self) -> Timestamp;

    /// Identity of this occurrence, for consumer-side deduplication.
    fn event_id(&self) -> EventId;
}

/// Wires a plain struct up as a [`DomainEvent`] by naming its fields.
///
/// ```ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct UserRegistered {
///     pub event_id: EventId,
///     pub user_id: UserId,
///     pub email: String,
///     pub occurred_at: Timestamp,
/// }
///
/// domain_event!(
///     UserRegistered,
///     event_type = "user.registered.v1",
///     schema_version = 1,
///     entity_id = user_id,
///     occurred_at = occurred_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        schema_version = $schema_version:expr,
        entity_id = $entity_id_field:ident,
        occurred_at = $occurred_field:ident,
        event_id = $event_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn schema_version(&self) -> u32 {
                $schema_version
            }

            fn entity_id(&self) -> String {
                self.$entity_id_field.to_string()
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_field
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$event_id_field.clone()
            }
        }
    };
}

pub use domain_event;

/// Identity of a single event occurrence.
///
/// Backed by a string rather than a [`Uuid`] so broker-assigned identifiers
/// (stream entry ids and the like) fit without a second type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Adopts an identifier assigned elsewhere. Not validated.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit that actually goes over the queue.
///
/// Consumers route on `event_type`, deduplicate on `event_id`, order on
/// `occurred_at`, and pick a decoder based on `schema_version`. The
/// payload stays opaque JSON until a handler claims it with
/// [`payload_as`](EventEnvelope::payload_as).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    pub schema_version: u32,
    pub entity_id: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
}

impl EventEnvelope {
    /// Builds an envelope around a raw payload, stamping a fresh id and
    /// the current time.
    ///
    /// The schema version is read off the `event_type` suffix; a type
    /// without a ".vN" suffix counts as version 1.
    pub fn new(
        event_type: impl Into<String>,
        entity_id: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        let schema_version = extract_version(&event_type);

        Self {
            event_id: EventId::new(),
            event_type,
            schema_version,
            entity_id: entity_id.into(),
            occurred_at: Timestamp::now(),
            payload,
        }
    }

    /// Lifts an envelope off a [`DomainEvent`], serializing the whole event
    /// as the payload.
    pub fn from_event<T>(event: &T) -> Self
    where
        T: DomainEvent + Serialize,
    {
        let event_type = event.event_type().to_string();
        let schema_version = extract_version(&event_type);

        Self {
            event_id: event.event_id(),
            event_type,
            schema_version,
            entity_id: event.entity_id(),
            occurred_at: event.occurred_at(),
            payload: serde_json::to_value(event)
                .expect("domain events are plain serializable structs"),
        }
    }

    /// Decodes the payload into a concrete event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

fn extract_version(event_type: &str) -> u32 {
    event_type
        .rsplit_once(".v")
        .and_then(|(_, version)| version.parse::<u32>().ok())
        .unwrap_or(1)
}

#[cfg(test)]
impl EventEnvelope {
    /// A well-formed envelope for tests that only need *some* envelope.
    pub fn test_fixture() -> Self {
        Self::new(
            "test.event.v1",
            "test-entity-123",
            serde_json::json!({"test": "data"}),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct AccountOpened {
        event_id: EventId,
        account_id: String,
        email: String,
        occurred_at: Timestamp,
    }

    domain_event!(
        AccountOpened,
        event_type = "account.opened.v1",
        schema_version = 1,
        entity_id = account_id,
        occurred_at = occurred_at,
        event_id = event_id
    );

    fn opened(account_id: &str) -> AccountOpened {
        AccountOpened {
            event_id: EventId::from_string(format!("evt-{account_id}")),
            account_id: account_id.to_string(),
            email: format!("{account_id}@example.com"),
            occurred_at: Timestamp::now(),
        }
    }

    #[test]
    fn event_ids_do_not_collide() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn event_id_adopts_external_identifiers() {
        let id = EventId::from_string("1718900000000-0");
        assert_eq!(id.as_str(), "1718900000000-0");
        assert_eq!(id.to_string(), "1718900000000-0");
    }

    #[test]
    fn event_id_is_a_bare_json_string() {
        let id = EventId::from_string("evt-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""evt-1""#);

        let back: EventId = serde_json::from_str(r#""evt-2""#).unwrap();
        assert_eq!(back.as_str(), "evt-2");
    }

    #[test]
    fn new_stamps_a_fresh_id_and_reads_the_version_suffix() {
        let envelope = EventEnvelope::new("user.registered.v2", "user-1", json!({"a": 1}));

        assert!(!envelope.event_id.as_str().is_empty());
        assert_eq!(envelope.schema_version, 2);
        assert_eq!(envelope.entity_id, "user-1");
        assert_eq!(envelope.payload["a"], 1);
    }

    #[test]
    fn version_suffix_parsing_covers_the_edges() {
        assert_eq!(extract_version("user.registered.v1"), 1);
        assert_eq!(extract_version("user.registered.v10"), 10);
        assert_eq!(extract_version("legacy.event"), 1);
        assert_eq!(extract_version("odd.vnot_a_number"), 1);
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = EventEnvelope::new("user.registered.v1", "user-1", json!({"e": "x"}));

        let wire = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope = serde_json::from_str(&wire).unwrap();

        assert_eq!(back.event_id, envelope.event_id);
        assert_eq!(back.event_type, envelope.event_type);
        assert_eq!(back.entity_id, envelope.entity_id);
        assert_eq!(back.occurred_at, envelope.occurred_at);
        assert_eq!(back.payload, envelope.payload);
    }

    #[test]
    fn payload_as_decodes_into_the_claimed_type() {
        #[derive(Debug, Deserialize)]
        struct Expected {
            value: i32,
        }

        let envelope = EventEnvelope::new("test.event.v1", "e-1", json!({"value": 42}));
        let decoded: Expected = envelope.payload_as().unwrap();
        assert_eq!(decoded.value, 42);
    }

    #[test]
    fn payload_as_rejects_a_mismatched_shape() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Expected {
            missing: String,
        }

        let envelope = EventEnvelope::new("test.event.v1", "e-1", json!({"other": true}));
        assert!(envelope.payload_as::<Expected>().is_err());
    }

    #[test]
    fn the_macro_implements_the_full_trait() {
        let event = opened("acct-1");

        assert_eq!(event.event_type(), "account.opened.v1");
        assert_eq!(event.schema_version(), 1);
        assert_eq!(event.entity_id(), "acct-1");
        assert_eq!(event.event_id().as_str(), "evt-acct-1");
    }

    #[test]
    fn from_event_lifts_routing_fields_and_serializes_the_rest() {
        let event = opened("acct-2");
        let when = event.occurred_at;

        let envelope = EventEnvelope::from_event(&event);

        assert_eq!(envelope.event_id.as_str(), "evt-acct-2");
        assert_eq!(envelope.event_type, "account.opened.v1");
        assert_eq!(envelope.schema_version, 1);
        assert_eq!(envelope.entity_id, "acct-2");
        assert_eq!(envelope.occurred_at, when);
        assert_eq!(envelope.payload["email"], "acct-2@example.com");
    }

    #[test]
    fn from_event_payload_decodes_back_into_the_event() {
        let envelope = EventEnvelope::from_event(&opened("acct-3"));

        let back: AccountOpened = envelope.payload_as().unwrap();
        assert_eq!(back.account_id, "acct-3");
        assert_eq!(back.email, "acct-3@example.com");
    }
}
