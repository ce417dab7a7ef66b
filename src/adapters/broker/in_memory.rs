//! In-memory broker transport for testing.
//!
//! Provides deterministic, same-process queue delivery so the queue
//! client's ack and requeue logic can be exercised without a broker.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in
//! production. It uses `.expect()` on lock operations which will panic if
//! locks are poisoned. Production code should use the Redis Streams
//! transport.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::resilience::ConnectionState;

use super::transport::{BrokerHealth, BrokerTransport, DeliveryTag, QueueStatus, RawDelivery};

#[derive(Debug, Clone)]
struct StoredMessage {
    tag: DeliveryTag,
    body: String,
    redelivered: bool,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    /// Delivered but neither acked nor requeued yet, keyed by tag.
    in_flight: HashMap<DeliveryTag, StoredMessage>,
}

/// In-memory broker transport for testing.
///
/// Features:
/// - FIFO delivery with stable, never-reused tags
/// - Strict settlement: acking or requeueing an unknown tag is an error,
///   which catches double-ack bugs in tests
/// - `receive` returns immediately instead of blocking, so consume loops
///   drain in deterministic test time
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryTransport {
    queues: Mutex<HashMap<String, QueueState>>,
    next_tag: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryTransport {
    /// Creates a transport with no queues.
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            next_tag: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    fn mint_tag(&self) -> DeliveryTag {
        let n = self.next_tag.fetch_add(1, Ordering::SeqCst);
        DeliveryTag::new(n.to_string())
    }

    // === Test Helpers ===

    /// Returns the bodies waiting for delivery, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn ready_bodies(&self, queue: &str) -> Vec<String> {
        self.queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .get(queue)
            .map(|q| q.ready.iter().map(|m| m.body.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns how many deliveries are out with a consumer, unsettled.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn in_flight_count(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .get(queue)
            .map(|q| q.in_flight.len())
            .unwrap_or(0)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerTransport for InMemoryTransport {
    async fn assert_queue(&self, queue: &str) -> Result<(), DomainError> {
        self.queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .entry(queue.to_string())
            .or_default();
        Ok(())
    }

    async fn send(&self, queue: &str, body: &str) -> Result<(), DomainError> {
        let message = StoredMessage {
            tag: self.mint_tag(),
            body: body.to_string(),
            redelivered: false,
        };
        self.queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .entry(queue.to_string())
            .or_default()
            .ready
            .push_back(message);
        Ok(())
    }

    async fn receive(&self, queue: &str) -> Result<Option<RawDelivery>, DomainError> {
        let mut queues = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned");
        let Some(state) = queues.get_mut(queue) else {
            return Ok(None);
        };
        let Some(message) = state.ready.pop_front() else {
            return Ok(None);
        };
        let delivery = RawDelivery {
            tag: message.tag.clone(),
            body: message.body.clone(),
            redelivered: message.redelivered,
        };
        state.in_flight.insert(message.tag.clone(), message);
        Ok(Some(delivery))
    }

    async fn ack(&self, queue: &str, tag: &DeliveryTag) -> Result<(), DomainError> {
        let mut queues = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned");
        let settled = queues
            .get_mut(queue)
            .and_then(|state| state.in_flight.remove(tag));
        if settled.is_none() {
            return Err(DomainError::new(
                ErrorCode::QueueError,
                format!("Unknown delivery tag {tag} on queue '{queue}'"),
            ));
        }
        Ok(())
    }

    async fn requeue(&self, queue: &str, delivery: &RawDelivery) -> Result<(), DomainError> {
        let replacement = StoredMessage {
            tag: self.mint_tag(),
            body: delivery.body.clone(),
            redelivered: true,
        };
        let mut queues = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned");
        let Some(state) = queues.get_mut(queue) else {
            return Err(DomainError::new(
                ErrorCode::QueueError,
                format!("Unknown queue '{queue}'"),
            ));
        };
        if state.in_flight.remove(&delivery.tag).is_none() {
            return Err(DomainError::new(
                ErrorCode::QueueError,
                format!("Unknown delivery tag {} on queue '{queue}'", delivery.tag),
            ));
        }
        state.ready.push_back(replacement);
        Ok(())
    }

    async fn queue_status(&self, queue: &str) -> QueueStatus {
        let queues = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned");
        match queues.get(queue) {
            Some(state) => QueueStatus {
                exists: true,
                messages: (state.ready.len() + state.in_flight.len()) as i64,
                // No consumer registry in the test double.
                consumers: 0,
            },
            None => QueueStatus::missing(),
        }
    }

    async fn purge(&self, queue: &str) -> Result<u64, DomainError> {
        let mut queues = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned");
        let Some(state) = queues.get_mut(queue) else {
            return Ok(0);
        };
        let dropped = state.ready.len() as u64;
        state.ready.clear();
        Ok(dropped)
    }

    async fn delete(&self, queue: &str) -> Result<(), DomainError> {
        self.queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .remove(queue);
        Ok(())
    }

    async fn status(&self) -> BrokerHealth {
        let state = if self.closed.load(Ordering::SeqCst) {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        };
        let mut queues: Vec<String> = self
            .queues
            .lock()
            .expect("InMemoryTransport: queues lock poisoned")
            .keys()
            .cloned()
            .collect();
        queues.sort();
        BrokerHealth {
            state,
            attempts: 0,
            queues,
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
