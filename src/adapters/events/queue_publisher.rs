//! Queue-backed event publisher.
//!
//! Serializes event envelopes onto a broker queue for consumers in other
//! processes. Failures propagate to the caller; producers decide whether
//! a dropped event is fatal for their operation.

use async_trait::async_trait;

use crate::adapters::broker::QueueClient;
use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes event envelopes to one broker queue.
#[derive(Clone)]
pub struct QueueEventPublisher {
    client: QueueClient,
    queue: String,
}

impl QueueEventPublisher {
    pub fn new(client: QueueClient, queue: impl Into<String>) -> Self {
        Self {
            client,
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for QueueEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.client.publish(&self.queue, &event).await?;
        tracing::debug!(
            queue = %self.queue,
            event_type = %event.event_type,
            event_id = %event.event_id,
            "Event published"
        );
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
