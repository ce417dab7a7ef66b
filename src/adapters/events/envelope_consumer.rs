//! Bridge from raw queue deliveries to typed event handlers.
//!
//! The broker hands consumers decoded JSON; application handlers want an
//! `EventEnvelope`. This adapter decodes the envelope and delegates, so
//! handler code never sees wire-level payloads.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::adapters::broker::MessageHandler;
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventHandler;

/// Decodes queue payloads into event envelopes before delegating.
///
/// A payload that does not decode as an envelope fails with
/// `SerializationError`, which the queue client turns into a requeue.
pub struct EnvelopeConsumer {
    handler: Arc<dyn EventHandler>,
}

impl EnvelopeConsumer {
    /// Wraps an event handler for use as a queue message handler.
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl MessageHandler for EnvelopeConsumer {
    async fn handle(&self, payload: JsonValue) -> Result<(), DomainError> {
        let envelope: EventEnvelope = serde_json::from_value(payload).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Malformed event envelope: {}", e),
            )
        })?;

        debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            "Event received"
        );

        self.handler.handle(envelope).await
    }

    fn name(&self) -> &'static str {
        self.handler.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CapturingHandler {
        seen: Mutex<Vec<EventEnvelope>>,
    }

    impl CapturingHandler {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<EventEnvelope> {
            self.seen.lock().expect("seen lock poisoned").clone()
        }
    }

    #[async_trait]
    impl EventHandler for CapturingHandler {
        async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
            self.seen.lock().expect("seen lock poisoned").push(event);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "capturing-handler"
        }
    }

    #[tokio::test]
    async fn decodes_envelope_and_delegates() {
        let handler = Arc::new(CapturingHandler::new());
        let consumer = EnvelopeConsumer::new(handler.clone());
        let envelope = EventEnvelope::test_fixture();
        let payload = serde_json::to_value(&envelope).unwrap();

        consumer.handle(payload).await.unwrap();

        let seen = handler.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_id, envelope.event_id);
        assert_eq!(seen[0].event_type, envelope.event_type);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_serialization_error() {
        let handler = Arc::new(CapturingHandler::new());
        let consumer = EnvelopeConsumer::new(handler.clone());

        let err = consumer
            .handle(serde_json::json!({"not": "an envelope"}))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SerializationError);
        assert!(handler.seen().is_empty());
    }

    #[tokio::test]
    async fn name_comes_from_the_wrapped_handler() {
        let consumer = EnvelopeConsumer::new(Arc::new(CapturingHandler::new()));

        assert_eq!(consumer.name(), "capturing-handler");
    }
}
