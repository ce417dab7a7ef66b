//! Redis Streams broker transport for production deployments.
//!
//! Each queue is one stream plus one consumer group shared by worker
//! instances. Acknowledged entries are deleted from the stream, so stream
//! length equals the unsettled backlog. A failed delivery is retired and
//! re-appended in one MULTI/EXEC block with a `redelivered` marker field.
//!
//! Connectivity goes through the retry supervisor: a dropped backend
//! reconnects lazily with exponential backoff, and operation errors
//! propagate to callers instead of being swallowed.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{
    StreamInfoConsumersReply, StreamMaxlen, StreamReadOptions, StreamReadReply,
};
use redis::AsyncCommands;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::adapters::redis::{is_connection_failure, RedisConnector};
use crate::config::BrokerConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::resilience::{BackoffPolicy, Clock, ConnectError, RetrySupervisor};

use super::transport::{BrokerHealth, BrokerTransport, DeliveryTag, QueueStatus, RawDelivery};

const BODY_FIELD: &str = "body";
const REDELIVERED_FIELD: &str = "redelivered";

/// Broker transport backed by Redis Streams consumer groups.
pub struct RedisStreamsTransport {
    supervisor: RetrySupervisor<RedisConnector>,
    group: String,
    consumer: String,
    block_ms: usize,
    asserted: Mutex<BTreeSet<String>>,
}

impl RedisStreamsTransport {
    /// Creates a transport from configuration. Does not dial yet; the
    /// first operation (or an explicit `connect`) does.
    pub fn new(config: &BrokerConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let connector = RedisConnector::new(&config.url, config.timeout())?;
        let policy = BackoffPolicy::new(
            config.retry.max_attempts,
            config.retry.base_delay(),
            config.retry.max_delay(),
        );
        Ok(Self {
            supervisor: RetrySupervisor::new("broker", connector, policy, clock),
            group: config.consumer_group.clone(),
            consumer: config.consumer_name.clone(),
            block_ms: config.block_timeout_ms as usize,
            asserted: Mutex::new(BTreeSet::new()),
        })
    }

    /// Dials eagerly, for startup init. Failures here still leave the
    /// transport usable; later operations retry lazily.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        self.supervisor.connect().await.map(|_| ())
    }

    async fn connection(&self, op: &'static str) -> Result<MultiplexedConnection, DomainError> {
        self.supervisor.ensure_connection().await.map_err(|err| {
            tracing::warn!(op, error = %err, "Broker unavailable");
            DomainError::from(err)
        })
    }

    async fn fail(&self, op: &'static str, queue: &str, err: redis::RedisError) -> DomainError {
        tracing::error!(op, queue, error = %err, "Broker operation failed");
        if is_connection_failure(&err) {
            self.supervisor.mark_disconnected().await;
        }
        DomainError::new(ErrorCode::QueueError, format!("{op} failed: {err}"))
    }

    fn remember_queue(&self, queue: &str) {
        self.asserted
            .lock()
            .expect("RedisStreamsTransport: asserted lock poisoned")
            .insert(queue.to_string());
    }

    async fn create_group(&self, queue: &str) -> Result<(), DomainError> {
        let mut conn = self.connection("assert_queue").await?;
        // Group starts at 0 so entries appended before the first consumer
        // came up are still delivered.
        match conn
            .xgroup_create_mkstream::<_, _, _, ()>(queue, &self.group, "0")
            .await
        {
            Ok(()) => {
                tracing::debug!(queue, group = %self.group, "Consumer group created");
                Ok(())
            }
            // The group already exists, which is the common case.
            Err(err) if err.code() == Some("BUSYGROUP") => Ok(()),
            Err(err) => Err(self.fail("assert_queue", queue, err).await),
        }
    }
}

impl fmt::Debug for RedisStreamsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStreamsTransport")
            .field("group", &self.group)
            .field("consumer", &self.consumer)
            .field("block_ms", &self.block_ms)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BrokerTransport for RedisStreamsTransport {
    async fn assert_queue(&self, queue: &str) -> Result<(), DomainError> {
        self.create_group(queue).await?;
        self.remember_queue(queue);
        Ok(())
    }

    async fn send(&self, queue: &str, body: &str) -> Result<(), DomainError> {
        let mut conn = self.connection("send").await?;
        match conn
            .xadd::<_, _, _, _, String>(queue, "*", &[(BODY_FIELD, body)])
            .await
        {
            Ok(entry_id) => {
                tracing::debug!(queue, entry_id, "Message appended");
                Ok(())
            }
            Err(err) => Err(self.fail("send", queue, err).await),
        }
    }

    async fn receive(&self, queue: &str) -> Result<Option<RawDelivery>, DomainError> {
        let mut conn = self.connection("receive").await?;
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(1)
            .block(self.block_ms);
        let reply: StreamReadReply = match conn.xread_options(&[queue], &[">"], &options).await {
            Ok(reply) => reply,
            // The group vanished (fresh or flushed Redis). Recreate it and
            // let the next poll pick up from there.
            Err(err) if err.code() == Some("NOGROUP") => {
                tracing::warn!(queue, group = %self.group, "Consumer group missing; recreating");
                self.create_group(queue).await?;
                return Ok(None);
            }
            Err(err) => return Err(self.fail("receive", queue, err).await),
        };

        let entry = reply
            .keys
            .into_iter()
            .find(|k| k.key == queue)
            .and_then(|k| k.ids.into_iter().next());
        let Some(entry) = entry else {
            return Ok(None);
        };

        let body: String = entry.get(BODY_FIELD).unwrap_or_default();
        let redelivered = entry.get::<i64>(REDELIVERED_FIELD).unwrap_or(0) == 1;
        Ok(Some(RawDelivery {
            tag: DeliveryTag::new(entry.id),
            body,
            redelivered,
        }))
    }

    async fn ack(&self, queue: &str, tag: &DeliveryTag) -> Result<(), DomainError> {
        let mut conn = self.connection("ack").await?;
        // Delete on ack so stream length stays equal to the backlog.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("XACK")
            .arg(queue)
            .arg(&self.group)
            .arg(tag.as_str())
            .ignore()
            .cmd("XDEL")
            .arg(queue)
            .arg(tag.as_str())
            .ignore();
        match pipe.query_async::<_, ()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("ack", queue, err).await),
        }
    }

    async fn requeue(&self, queue: &str, delivery: &RawDelivery) -> Result<(), DomainError> {
        let mut conn = self.connection("requeue").await?;
        // Retire the failed entry and append the copy in one transaction,
        // so a crash in between cannot lose or duplicate the message.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("XACK")
            .arg(queue)
            .arg(&self.group)
            .arg(delivery.tag.as_str())
            .ignore()
            .cmd("XDEL")
            .arg(queue)
            .arg(delivery.tag.as_str())
            .ignore()
            .cmd("XADD")
            .arg(queue)
            .arg("*")
            .arg(BODY_FIELD)
            .arg(&delivery.body)
            .arg(REDELIVERED_FIELD)
            .arg(1)
            .ignore();
        match pipe.query_async::<_, ()>(&mut conn).await {
            Ok(()) => {
                tracing::debug!(queue, tag = %delivery.tag, "Delivery requeued");
                Ok(())
            }
            Err(err) => Err(self.fail("requeue", queue, err).await),
        }
    }

    async fn queue_status(&self, queue: &str) -> QueueStatus {
        let Ok(mut conn) = self.connection("queue_status").await else {
            return QueueStatus::missing();
        };

        let exists = match conn.exists::<_, bool>(queue).await {
            Ok(exists) => exists,
            Err(err) => {
                self.fail("queue_status", queue, err).await;
                return QueueStatus::missing();
            }
        };
        if !exists {
            return QueueStatus::missing();
        }

        let messages = conn.xlen::<_, i64>(queue).await.unwrap_or(0);
        // NOGROUP before the first assert is expected; report no consumers.
        let consumers = conn
            .xinfo_consumers::<_, _, StreamInfoConsumersReply>(queue, &self.group)
            .await
            .map(|reply| reply.consumers.len() as i64)
            .unwrap_or(0);

        QueueStatus {
            exists: true,
            messages,
            consumers,
        }
    }

    async fn purge(&self, queue: &str) -> Result<u64, DomainError> {
        let mut conn = self.connection("purge").await?;
        match conn.xtrim::<_, i64>(queue, StreamMaxlen::Equals(0)).await {
            Ok(dropped) => {
                tracing::info!(queue, dropped, "Queue purged");
                Ok(dropped as u64)
            }
            Err(err) => Err(self.fail("purge", queue, err).await),
        }
    }

    async fn delete(&self, queue: &str) -> Result<(), DomainError> {
        let mut conn = self.connection("delete").await?;
        match conn.del::<_, i64>(queue).await {
            Ok(_) => {
                self.asserted
                    .lock()
                    .expect("RedisStreamsTransport: asserted lock poisoned")
                    .remove(queue);
                tracing::info!(queue, "Queue deleted");
                Ok(())
            }
            Err(err) => Err(self.fail("delete", queue, err).await),
        }
    }

    async fn status(&self) -> BrokerHealth {
        let status = self.supervisor.status().await;
        let queues = self
            .asserted
            .lock()
            .expect("RedisStreamsTransport: asserted lock poisoned")
            .iter()
            .cloned()
            .collect();
        BrokerHealth {
            state: status.state,
            attempts: status.attempts,
            queues,
        }
    }

    async fn close(&self) {
        self.supervisor.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::domain::resilience::{ConnectionState, ManualClock};

    /// Nothing listens on this port, so dials fail fast with a refusal.
    fn unreachable_config() -> BrokerConfig {
        BrokerConfig {
            url: "redis://127.0.0.1:6399".to_string(),
            timeout_secs: 1,
            retry: RetryConfig {
                max_attempts: 1,
                base_delay_ms: 1,
                max_delay_ms: 10,
            },
            ..Default::default()
        }
    }

    fn unreachable_transport() -> RedisStreamsTransport {
        RedisStreamsTransport::new(&unreachable_config(), Arc::new(ManualClock::new())).unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = BrokerConfig {
            url: "redis://not a url/".to_string(),
            ..unreachable_config()
        };
        assert!(RedisStreamsTransport::new(&config, Arc::new(ManualClock::new())).is_err());
    }

    #[tokio::test]
    async fn test_operations_propagate_when_backend_unreachable() {
        let transport = unreachable_transport();

        let send = transport.send("jobs", "{}").await;
        assert_eq!(send.unwrap_err().code, ErrorCode::ConnectionError);

        let asserted = transport.assert_queue("jobs").await;
        assert_eq!(asserted.unwrap_err().code, ErrorCode::ConnectionError);

        let receive = transport.receive("jobs").await;
        assert_eq!(receive.unwrap_err().code, ErrorCode::ConnectionError);
    }

    #[tokio::test]
    async fn test_queue_status_reports_missing_when_unreachable() {
        let transport = unreachable_transport();
        assert_eq!(transport.queue_status("jobs").await, QueueStatus::missing());
    }

    #[tokio::test]
    async fn test_health_reflects_failed_dials() {
        let transport = unreachable_transport();
        let _ = transport.send("jobs", "{}").await;

        let health = transport.status().await;
        assert_ne!(health.state, ConnectionState::Connected);
        assert!(health.attempts >= 1);
        assert!(health.queues.is_empty());
    }

    // Round-trip coverage against a real broker lives with the queue
    // client's in-memory tests; run these manually when needed.
    //
    // #[tokio::test]
    // #[ignore] // Requires Redis on localhost:6379
    // async fn test_send_receive_ack_round_trip() {
    //     let config = BrokerConfig {
    //         url: "redis://127.0.0.1:6379".to_string(),
    //         ..Default::default()
    //     };
    //     let transport =
    //         RedisStreamsTransport::new(&config, Arc::new(SystemClock)).unwrap();
    //     transport.assert_queue("it_jobs").await.unwrap();
    //     transport.send("it_jobs", r#"{"n":1}"#).await.unwrap();
    //     let delivery = transport.receive("it_jobs").await.unwrap().unwrap();
    //     assert_eq!(delivery.body, r#"{"n":1}"#);
    //     transport.ack("it_jobs", &delivery.tag).await.unwrap();
    //     transport.delete("it_jobs").await.unwrap();
    // }
}
