//! Ports for emitting and consuming domain events.
//!
//! The application publishes through [`EventPublisher`] and never learns
//! which transport carried the envelope; the worker plugs consumers in
//! through [`EventHandler`].

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (handlers may receive duplicates)
/// - Errors are propagated to the caller; swallowing is the caller's call
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events sequentially.
    ///
    /// Stops at the first failure; events already sent stay sent. There is
    /// no atomic batch on the queue transport.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

/// Port for reacting to delivered domain events.
///
/// Delivery is at-least-once, so handlers must tolerate seeing the same
/// envelope more than once. Returning an error requeues the event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a delivered event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}
