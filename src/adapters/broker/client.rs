//! Queue client: message semantics on top of a broker transport.
//!
//! The client owns everything a transport should not know about: JSON
//! encoding, the prefetch-one consume loop, and the settlement policy
//! (ack on success, requeue on failure, ignore empty bodies). Publish
//! failures propagate to the caller; whether a lost event is acceptable
//! is the producer's call, not the client's.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::transport::{BrokerHealth, BrokerTransport, QueueStatus};

/// Pause between polls after a transient consume failure.
const POLL_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Processes one decoded message at a time.
///
/// Returning an error requeues the message for redelivery, so handlers
/// must tolerate seeing the same payload more than once.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: JsonValue) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// How one consume poll was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// A message was decoded, handled, and acknowledged.
    Processed,
    /// Decoding or handling failed; the message went back to the queue.
    Requeued,
    /// The delivery had an empty body and was left unsettled.
    Ignored,
    /// The poll elapsed with nothing to deliver.
    Idle,
}

/// Message-level queue operations over any [`BrokerTransport`].
#[derive(Clone)]
pub struct QueueClient {
    transport: Arc<dyn BrokerTransport>,
}

impl QueueClient {
    pub fn new(transport: Arc<dyn BrokerTransport>) -> Self {
        Self { transport }
    }

    /// Ensures the queue exists. Safe to repeat.
    pub async fn assert_queue(&self, queue: &str) -> Result<(), DomainError> {
        self.transport.assert_queue(queue).await
    }

    /// Encodes a message as JSON and appends it to the queue.
    ///
    /// The queue is asserted first, so publishing to a queue nobody has
    /// consumed from yet still lands durably.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` when encoding fails and propagates
    /// transport errors unchanged.
    pub async fn publish<T: Serialize>(&self, queue: &str, message: &T) -> Result<(), DomainError> {
        let body = serde_json::to_string(message).map_err(|err| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Failed to encode message: {err}"),
            )
        })?;
        self.transport.assert_queue(queue).await?;
        self.transport.send(queue, &body).await?;
        tracing::debug!(queue, bytes = body.len(), "Message published");
        Ok(())
    }

    /// Polls once and settles whatever arrives.
    ///
    /// One delivery is in flight at a time: the previous message is acked
    /// or requeued before this method returns, so a crashed worker leaves
    /// at most one message unsettled.
    pub async fn consume_next(
        &self,
        queue: &str,
        handler: &dyn MessageHandler,
    ) -> Result<ConsumeOutcome, DomainError> {
        let Some(delivery) = self.transport.receive(queue).await? else {
            return Ok(ConsumeOutcome::Idle);
        };

        if delivery.body.trim().is_empty() {
            tracing::debug!(queue, tag = %delivery.tag, "Ignoring delivery with empty body");
            return Ok(ConsumeOutcome::Ignored);
        }

        let payload: JsonValue = match serde_json::from_str(&delivery.body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(queue, tag = %delivery.tag, error = %err, "Undecodable message; requeueing");
                self.transport.requeue(queue, &delivery).await?;
                return Ok(ConsumeOutcome::Requeued);
            }
        };

        match handler.handle(payload).await {
            Ok(()) => {
                self.transport.ack(queue, &delivery.tag).await?;
                tracing::debug!(queue, tag = %delivery.tag, "Message processed");
                Ok(ConsumeOutcome::Processed)
            }
            Err(err) => {
                tracing::warn!(
                    queue,
                    handler = handler.name(),
                    tag = %delivery.tag,
                    error = %err,
                    "Handler failed; requeueing message"
                );
                self.transport.requeue(queue, &delivery).await?;
                Ok(ConsumeOutcome::Requeued)
            }
        }
    }

    /// Consumes the queue until the broker is terminally unreachable.
    ///
    /// Transient poll failures are logged and retried after a short pause.
    /// Once the transport reports its retry budget spent, the loop stops
    /// and returns the error so the process can exit and be restarted.
    pub async fn run(
        &self,
        queue: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), DomainError> {
        self.transport.assert_queue(queue).await?;
        tracing::info!(queue, handler = handler.name(), "Consumer started");
        loop {
            match self.consume_next(queue, handler.as_ref()).await {
                Ok(ConsumeOutcome::Idle) => {
                    // Blocking happens in the transport; this keeps a
                    // non-blocking transport from starving the runtime.
                    tokio::task::yield_now().await;
                }
                Ok(_) => {}
                Err(err) if err.details.contains_key("retries_exhausted") => {
                    tracing::error!(queue, error = %err, "Broker unreachable; stopping consumer");
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(queue, error = %err, "Consume poll failed; retrying");
                    tokio::time::sleep(POLL_RETRY_PAUSE).await;
                }
            }
        }
    }

    /// Queue counters for monitoring endpoints.
    pub async fn queue_status(&self, queue: &str) -> QueueStatus {
        self.transport.queue_status(queue).await
    }

    /// Drops all ready messages, returning how many were removed.
    pub async fn purge_queue(&self, queue: &str) -> Result<u64, DomainError> {
        self.transport.purge(queue).await
    }

    /// Removes the queue and everything in it.
    pub async fn delete_queue(&self, queue: &str) -> Result<(), DomainError> {
        self.transport.delete(queue).await
    }

    /// Broker connectivity snapshot.
    pub async fn status(&self) -> BrokerHealth {
        self.transport.status().await
    }

    /// Releases the broker connection for shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing broker connection");
        self.transport.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::super::in_memory::InMemoryTransport;
    use super::super::transport::{DeliveryTag, RawDelivery};
    use super::*;
    use crate::domain::foundation::EventEnvelope;
    use crate::domain::resilience::ConnectionState;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingHandler {
        seen: Mutex<Vec<JsonValue>>,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<JsonValue> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageHandler for CountingHandler {
        async fn handle(&self, payload: JsonValue) -> Result<(), DomainError> {
            self.seen.lock().unwrap().push(payload);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    /// Fails the first `failures_left` calls, then succeeds.
    struct FlakyHandler {
        seen: Mutex<Vec<JsonValue>>,
        failures_left: AtomicUsize,
    }

    impl FlakyHandler {
        fn failing_once() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                failures_left: AtomicUsize::new(1),
            }
        }
    }

    #[async_trait]
    impl MessageHandler for FlakyHandler {
        async fn handle(&self, payload: JsonValue) -> Result<(), DomainError> {
            self.seen.lock().unwrap().push(payload);
            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(DomainError::new(ErrorCode::InternalError, "Flaky failure"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "FlakyHandler"
        }
    }

    fn client_over(transport: Arc<InMemoryTransport>) -> QueueClient {
        QueueClient::new(transport)
    }

    #[tokio::test]
    async fn every_published_message_is_consumed_and_acked() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());
        let handler = CountingHandler::new();

        for n in 0..5 {
            client.publish("jobs", &json!({ "n": n })).await.unwrap();
        }

        let mut processed = 0;
        loop {
            match client.consume_next("jobs", &handler).await.unwrap() {
                ConsumeOutcome::Processed => processed += 1,
                ConsumeOutcome::Idle => break,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(processed, 5);
        let seen = handler.seen();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], json!({ "n": 0 }));
        assert_eq!(seen[4], json!({ "n": 4 }));
        assert_eq!(client.queue_status("jobs").await.messages, 0);
        assert_eq!(transport.in_flight_count("jobs"), 0);
    }

    #[tokio::test]
    async fn failed_delivery_is_requeued_exactly_once_then_acked() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());
        let handler = FlakyHandler::failing_once();

        client.publish("jobs", &json!({ "id": 7 })).await.unwrap();

        let first = client.consume_next("jobs", &handler).await.unwrap();
        assert_eq!(first, ConsumeOutcome::Requeued);
        assert_eq!(client.queue_status("jobs").await.messages, 1);

        let second = client.consume_next("jobs", &handler).await.unwrap();
        assert_eq!(second, ConsumeOutcome::Processed);

        let seen = handler.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![json!({ "id": 7 }), json!({ "id": 7 })]);
        assert_eq!(
            client.consume_next("jobs", &handler).await.unwrap(),
            ConsumeOutcome::Idle
        );
        assert_eq!(client.queue_status("jobs").await.messages, 0);
    }

    #[tokio::test]
    async fn empty_body_is_ignored_without_settling() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());
        let handler = CountingHandler::new();

        transport.send("jobs", "   ").await.unwrap();

        let outcome = client.consume_next("jobs", &handler).await.unwrap();
        assert_eq!(outcome, ConsumeOutcome::Ignored);
        assert!(handler.seen().is_empty());
        // Neither acked nor requeued: the delivery stays in flight.
        assert_eq!(transport.in_flight_count("jobs"), 1);
        assert_eq!(
            client.consume_next("jobs", &handler).await.unwrap(),
            ConsumeOutcome::Idle
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_requeued() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());
        let handler = CountingHandler::new();

        transport.send("jobs", "not {json").await.unwrap();

        let outcome = client.consume_next("jobs", &handler).await.unwrap();
        assert_eq!(outcome, ConsumeOutcome::Requeued);
        assert!(handler.seen().is_empty());
        assert_eq!(transport.ready_bodies("jobs"), vec!["not {json"]);
    }

    #[tokio::test]
    async fn publish_round_trips_an_event_envelope() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());

        let envelope = EventEnvelope::test_fixture();
        client.publish("events", &envelope).await.unwrap();

        let bodies = transport.ready_bodies("events");
        assert_eq!(bodies.len(), 1);
        let decoded: EventEnvelope = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(decoded.event_id, envelope.event_id);
        assert_eq!(decoded.event_type, envelope.event_type);
    }

    #[tokio::test]
    async fn publish_propagates_transport_failure() {
        struct RefusingTransport;

        #[async_trait]
        impl BrokerTransport for RefusingTransport {
            async fn assert_queue(&self, _queue: &str) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn send(&self, _queue: &str, _body: &str) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn receive(&self, _queue: &str) -> Result<Option<RawDelivery>, DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn ack(&self, _queue: &str, _tag: &DeliveryTag) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn requeue(
                &self,
                _queue: &str,
                _delivery: &RawDelivery,
            ) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn queue_status(&self, _queue: &str) -> QueueStatus {
                QueueStatus::missing()
            }
            async fn purge(&self, _queue: &str) -> Result<u64, DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn delete(&self, _queue: &str) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::QueueError, "refused"))
            }
            async fn status(&self) -> BrokerHealth {
                BrokerHealth {
                    state: ConnectionState::Disconnected,
                    attempts: 0,
                    queues: Vec::new(),
                }
            }
            async fn close(&self) {}
        }

        let client = QueueClient::new(Arc::new(RefusingTransport));
        let err = client.publish("jobs", &json!({})).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::QueueError);
    }

    #[tokio::test]
    async fn run_consumes_messages_as_they_arrive() {
        let transport = Arc::new(InMemoryTransport::new());
        let client = client_over(transport.clone());
        let handler = Arc::new(CountingHandler::new());

        let consumer = tokio::spawn({
            let client = client.clone();
            let handler = handler.clone();
            async move { client.run("jobs", handler).await }
        });

        client.publish("jobs", &json!({ "n": 1 })).await.unwrap();
        client.publish("jobs", &json!({ "n": 2 })).await.unwrap();

        for _ in 0..500 {
            if handler.seen().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        consumer.abort();

        assert_eq!(handler.seen().len(), 2);
        assert_eq!(client.queue_status("jobs").await.messages, 0);
    }

    #[tokio::test]
    async fn run_stops_when_retries_are_exhausted() {
        struct DeadBrokerTransport;

        #[async_trait]
        impl BrokerTransport for DeadBrokerTransport {
            async fn assert_queue(&self, _queue: &str) -> Result<(), DomainError> {
                Ok(())
            }
            async fn send(&self, _queue: &str, _body: &str) -> Result<(), DomainError> {
                Ok(())
            }
            async fn receive(&self, _queue: &str) -> Result<Option<RawDelivery>, DomainError> {
                Err(DomainError::new(
                    ErrorCode::ConnectionError,
                    "gave up after 11 failed connection attempts",
                )
                .with_detail("retries_exhausted", "true"))
            }
            async fn ack(&self, _queue: &str, _tag: &DeliveryTag) -> Result<(), DomainError> {
                Ok(())
            }
            async fn requeue(
                &self,
                _queue: &str,
                _delivery: &RawDelivery,
            ) -> Result<(), DomainError> {
                Ok(())
            }
            async fn queue_status(&self, _queue: &str) -> QueueStatus {
                QueueStatus::missing()
            }
            async fn purge(&self, _queue: &str) -> Result<u64, DomainError> {
                Ok(0)
            }
            async fn delete(&self, _queue: &str) -> Result<(), DomainError> {
                Ok(())
            }
            async fn status(&self) -> BrokerHealth {
                BrokerHealth {
                    state: ConnectionState::Disconnected,
                    attempts: 11,
                    queues: Vec::new(),
                }
            }
            async fn close(&self) {}
        }

        let client = QueueClient::new(Arc::new(DeadBrokerTransport));
        let handler = Arc::new(CountingHandler::new());

        let result = client.run("jobs", handler).await;
        assert_eq!(result.unwrap_err().code, ErrorCode::ConnectionError);
    }
}
