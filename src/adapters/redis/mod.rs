//! Redis connection plumbing shared by the cache and broker adapters.
//!
//! `RedisConnector` performs exactly one dial per call; all retry and
//! backoff behavior lives in the retry supervisor that wraps it.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::resilience::{Connector, ConnectorError};

/// Dials a single multiplexed Redis connection with a connect timeout.
pub struct RedisConnector {
    client: redis::Client,
    connect_timeout: Duration,
}

impl RedisConnector {
    /// Creates a connector for the given URL.
    ///
    /// Fails fast on an unparseable URL; network errors surface later,
    /// per attempt.
    pub fn new(url: &str, connect_timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(|e| {
            DomainError::new(
                ErrorCode::ConnectionError,
                format!("Invalid Redis URL: {e}"),
            )
        })?;
        Ok(Self {
            client,
            connect_timeout,
        })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Connection = MultiplexedConnection;

    async fn connect(&self) -> Result<MultiplexedConnection, ConnectorError> {
        match tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_tokio_connection(),
        )
        .await
        {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(ConnectorError::new(e.to_string())),
            Err(_) => Err(ConnectorError::new(format!(
                "connect timed out after {:?}",
                self.connect_timeout
            ))),
        }
    }
}

/// Returns true if a command failure means the connection itself is gone
/// and the supervisor should drop it.
pub fn is_connection_failure(err: &redis::RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal()
}
