//! Recording publisher used by handler unit tests.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// [`EventPublisher`] that appends envelopes to an in-process list instead
/// of sending them anywhere.
///
/// Tests read back what was published with [`published_events`] and force
/// the error path with [`fail_with`]. Lock poisoning panics; fine for test
/// code, which is the only place this type belongs.
///
/// [`published_events`]: RecordingEventPublisher::published_events
/// [`fail_with`]: RecordingEventPublisher::fail_with
pub struct RecordingEventPublisher {
    published: RwLock<Vec<EventEnvelope>>,
    failure: RwLock<Option<DomainError>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// Makes every subsequent publish fail with the given error.
    pub fn fail_with(&self, error: DomainError) {
        *self.failure.write().expect("failure lock poisoned") = Some(error);
    }

    /// Everything published so far, in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .expect("published lock poisoned")
            .clone()
    }

    pub fn event_count(&self) -> usize {
        self.published.read().expect("published lock poisoned").len()
    }
}

impl Default for RecordingEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let forced = self.failure.read().expect("failure lock poisoned").clone();
        if let Some(error) = forced {
            return Err(error);
        }
        self.published
            .write()
            .expect("published lock poisoned")
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
