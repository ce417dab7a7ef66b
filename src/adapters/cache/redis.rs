//! Redis-backed cache implementation for production deployments.
//!
//! Every operation goes through the retry supervisor's `ensure_connection`
//! first, so a dropped backend reconnects lazily with exponential backoff.
//! Per the cache contract, failures are logged and swallowed: callers get
//! a miss (or false / -2 / empty list), never an error.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::adapters::redis::{is_connection_failure, RedisConnector};
use crate::config::RedisConfig;
use crate::domain::foundation::DomainError;
use crate::domain::resilience::{
    BackoffPolicy, Clock, ConnectError, ConnectionStatus, RetrySupervisor,
};
use crate::ports::{Cache, CacheHealth};

/// Redis cache client built on the retry supervisor.
#[derive(Clone)]
pub struct RedisCacheClient {
    supervisor: RetrySupervisor<RedisConnector>,
}

impl RedisCacheClient {
    /// Creates a client from configuration. Does not dial yet; the first
    /// use (or an explicit `connect`) does.
    pub fn new(config: &RedisConfig, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        let connector = RedisConnector::new(&config.url, config.timeout())?;
        let policy = BackoffPolicy::new(
            config.retry.max_attempts,
            config.retry.base_delay(),
            config.retry.max_delay(),
        );
        Ok(Self {
            supervisor: RetrySupervisor::new("cache", connector, policy, clock),
        })
    }

    /// Dials eagerly, for startup init. Failures here still leave the
    /// client usable; later operations retry lazily.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        self.supervisor.connect().await.map(|_| ())
    }

    /// Drops the connection for shutdown.
    pub async fn close(&self) {
        self.supervisor.close().await;
    }

    /// Supervisor snapshot, for logs and health reporting.
    pub async fn connection_status(&self) -> ConnectionStatus {
        self.supervisor.status().await
    }

    async fn connection_for(&self, op: &'static str) -> Option<MultiplexedConnection> {
        match self.supervisor.ensure_connection().await {
            Ok(conn) => Some(conn),
            Err(err) => {
                tracing::warn!(op, error = %err, "Cache unavailable; returning default");
                None
            }
        }
    }

    async fn note_failure(&self, op: &'static str, key: &str, err: &redis::RedisError) {
        tracing::error!(op, key, error = %err, "Cache operation failed");
        if is_connection_failure(err) {
            self.supervisor.mark_disconnected().await;
        }
    }
}

#[async_trait]
impl Cache for RedisCacheClient {
    async fn get(&self, key: &str) -> Option<JsonValue> {
        let mut conn = self.connection_for("get").await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "Cache hit");
                    Some(value)
                }
                Err(_) => {
                    tracing::warn!(key, "Cached value is not JSON; returning raw string");
                    Some(JsonValue::String(raw))
                }
            },
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                None
            }
            Err(err) => {
                self.note_failure("get", key, &err).await;
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &JsonValue, ttl_secs: i64) {
        let Some(mut conn) = self.connection_for("set").await else {
            return;
        };
        let text = match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };

        let result: Result<(), redis::RedisError> = if ttl_secs > 0 {
            redis::cmd("SETEX")
                .arg(key)
                .arg(ttl_secs)
                .arg(&text)
                .query_async(&mut conn)
                .await
        } else {
            conn.set(key, &text).await
        };

        match result {
            Ok(()) => tracing::debug!(key, ttl_secs, "Cache set"),
            Err(err) => self.note_failure("set", key, &err).await,
        }
    }

    async fn delete(&self, key: &str) {
        let Some(mut conn) = self.connection_for("delete").await else {
            return;
        };
        match conn.del::<_, ()>(key).await {
            Ok(()) => tracing::debug!(key, "Cache deleted"),
            Err(err) => self.note_failure("delete", key, &err).await,
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let Some(mut conn) = self.connection_for("exists").await else {
            return false;
        };
        match conn.exists::<_, bool>(key).await {
            Ok(found) => found,
            Err(err) => {
                self.note_failure("exists", key, &err).await;
                false
            }
        }
    }

    async fn incr(&self, key: &str) -> Option<i64> {
        let mut conn = self.connection_for("incr").await?;
        match conn.incr::<_, _, i64>(key, 1_i64).await {
            Ok(value) => Some(value),
            Err(err) => {
                self.note_failure("incr", key, &err).await;
                None
            }
        }
    }

    async fn decr(&self, key: &str) -> Option<i64> {
        let mut conn = self.connection_for("decr").await?;
        match conn.decr::<_, _, i64>(key, 1_i64).await {
            Ok(value) => Some(value),
            Err(err) => {
                self.note_failure("decr", key, &err).await;
                None
            }
        }
    }

    async fn expire(&self, key: &str, ttl_secs: i64) {
        let Some(mut conn) = self.connection_for("expire").await else {
            return;
        };
        match conn.expire::<_, ()>(key, ttl_secs).await {
            Ok(()) => tracing::debug!(key, ttl_secs, "Cache expiration set"),
            Err(err) => self.note_failure("expire", key, &err).await,
        }
    }

    async fn ttl(&self, key: &str) -> i64 {
        let Some(mut conn) = self.connection_for("ttl").await else {
            return -2;
        };
        match conn.ttl::<_, i64>(key).await {
            Ok(ttl) => ttl,
            Err(err) => {
                self.note_failure("ttl", key, &err).await;
                -2
            }
        }
    }

    async fn keys(&self, pattern: &str) -> Vec<String> {
        let Some(mut conn) = self.connection_for("keys").await else {
            return Vec::new();
        };
        match conn.keys::<_, Vec<String>>(pattern).await {
            Ok(keys) => keys,
            Err(err) => {
                self.note_failure("keys", pattern, &err).await;
                Vec::new()
            }
        }
    }

    async fn flush_all(&self) {
        let Some(mut conn) = self.connection_for("flush_all").await else {
            return;
        };
        let result: Result<(), redis::RedisError> =
            redis::cmd("FLUSHALL").query_async(&mut conn).await;
        match result {
            Ok(()) => tracing::info!("Cache flushed"),
            Err(err) => self.note_failure("flush_all", "*", &err).await,
        }
    }

    async fn status(&self) -> CacheHealth {
        let status = self.supervisor.status().await;
        CacheHealth {
            state: status.state,
            attempts: status.attempts,
        }
    }

    async fn health_check(&self) -> bool {
        const PROBE: &str = "datadock:health:probe";

        let Some(mut conn) = self.connection_for("health_check").await else {
            return false;
        };
        let stored: Result<(), redis::RedisError> = redis::cmd("SETEX")
            .arg(PROBE)
            .arg(10)
            .arg("ok")
            .query_async(&mut conn)
            .await;
        if let Err(err) = stored {
            self.note_failure("health_check", PROBE, &err).await;
            return false;
        }
        match conn.get::<_, Option<String>>(PROBE).await {
            Ok(value) => value.as_deref() == Some("ok"),
            Err(err) => {
                self.note_failure("health_check", PROBE, &err).await;
                false
            }
        }
    }
}
