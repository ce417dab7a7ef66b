//! Delivery-level transport seam beneath the queue client.
//!
//! The client owns message semantics (encoding, ack/requeue policy, the
//! consume loop); a transport only moves opaque bodies in and out of a
//! named queue. Keeping the seam this low lets the same client logic run
//! against Redis Streams in production and an in-memory double in tests.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::domain::foundation::DomainError;
use crate::domain::resilience::ConnectionState;

/// Opaque per-delivery handle used to acknowledge or requeue a message.
///
/// For Redis Streams this is the stream entry ID; the in-memory transport
/// uses a process-local counter. Tags are never reused within a queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryTag(String);

impl DeliveryTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One message handed to a consumer, not yet acknowledged.
#[derive(Debug, Clone)]
pub struct RawDelivery {
    pub tag: DeliveryTag,
    /// Message body exactly as published.
    pub body: String,
    /// True if this delivery is a requeued copy of an earlier failure.
    pub redelivered: bool,
}

/// Point-in-time counters for one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub exists: bool,
    /// Messages not yet acknowledged (ready plus in flight).
    pub messages: i64,
    /// Consumers currently registered on the queue.
    pub consumers: i64,
}

impl QueueStatus {
    /// Status reported when the queue cannot be inspected.
    pub fn missing() -> Self {
        Self {
            exists: false,
            messages: 0,
            consumers: 0,
        }
    }
}

/// Broker connectivity snapshot, exposed through the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerHealth {
    pub state: ConnectionState,
    pub attempts: u32,
    /// Queues asserted by this process since startup.
    pub queues: Vec<String>,
}

/// Moves opaque message bodies in and out of named queues.
///
/// # Design
///
/// - Deliveries stay outstanding until `ack` or `requeue`; a transport never
///   drops an unacknowledged message on its own.
/// - `requeue` atomically retires the failed delivery and appends a fresh
///   copy flagged `redelivered`, so the backlog never double-counts it.
/// - `send` creates the queue implicitly; `assert_queue` additionally sets
///   up consumer-side state and is safe to repeat.
/// - Errors propagate. Unlike the cache, a lost broker message is data loss,
///   so callers decide how to handle failure.
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    /// Ensures the queue and its consumer-side state exist.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` when the broker is unreachable.
    async fn assert_queue(&self, queue: &str) -> Result<(), DomainError>;

    /// Appends one message body to the queue.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` or `QueueError` when the append fails; the
    /// message was not stored.
    async fn send(&self, queue: &str, body: &str) -> Result<(), DomainError>;

    /// Waits up to the transport's block timeout for one delivery.
    ///
    /// Returns `Ok(None)` when the wait elapsed with nothing to deliver.
    /// At most one delivery is outstanding per call; callers settle it
    /// before polling again.
    async fn receive(&self, queue: &str) -> Result<Option<RawDelivery>, DomainError>;

    /// Marks a delivery as successfully processed and drops it.
    async fn ack(&self, queue: &str, tag: &DeliveryTag) -> Result<(), DomainError>;

    /// Returns a failed delivery to the queue as a redelivered copy.
    async fn requeue(&self, queue: &str, delivery: &RawDelivery) -> Result<(), DomainError>;

    /// Inspects queue counters. Reports a missing queue instead of failing
    /// when the broker cannot be reached.
    async fn queue_status(&self, queue: &str) -> QueueStatus;

    /// Drops all ready messages, returning how many were removed.
    async fn purge(&self, queue: &str) -> Result<u64, DomainError>;

    /// Removes the queue and everything in it.
    async fn delete(&self, queue: &str) -> Result<(), DomainError>;

    /// Current connectivity and the queues asserted so far.
    async fn status(&self) -> BrokerHealth;

    /// Releases the underlying connection. Idempotent.
    async fn close(&self);
}
