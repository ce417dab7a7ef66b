//! Retry supervisor - the connection state machine shared by the cache and
//! queue clients.
//!
//! The supervisor owns one backend connection and drives it through the
//! [`ConnectionState`] lifecycle:
//!
//! - `ensure_connection()` is the lazy path: callers get the live connection,
//!   or trigger a connect if there is none.
//! - A failed connect schedules a background retry after an exponential
//!   backoff delay, up to the policy's attempt budget.
//! - Past the budget the supervisor gives up: no further automatic retries,
//!   and every subsequent `ensure_connection()` surfaces a terminal error
//!   until [`RetrySupervisor::connect`] is called manually.
//!
//! Concurrent `ensure_connection()` calls during a disconnected window are
//! serialized through an internal gate so exactly one connect attempt is in
//! flight at a time; late arrivals observe the winner's result instead of
//! dialing again.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use super::backoff::BackoffPolicy;
use super::clock::Clock;
use super::state::ConnectionState;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Error from a single low-level connect attempt.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ConnectorError {
    pub message: String,
}

impl ConnectorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for establishing one backend connection.
///
/// Implementations dial the backend once per call; all retry and backoff
/// logic lives in the supervisor.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Handle to an established connection. Cheap to clone; cloned handles
    /// share the underlying connection.
    type Connection: Clone + Send + Sync + 'static;

    /// Attempts to establish a fresh connection.
    async fn connect(&self) -> Result<Self::Connection, ConnectorError>;
}

/// Errors surfaced by the supervisor to its callers.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// A connect attempt failed; a background retry has been scheduled
    /// unless the budget is exhausted.
    #[error("connection attempt {attempt} failed: {message}")]
    AttemptFailed { attempt: u32, message: String },

    /// The attempt budget is spent. Terminal until a manual `connect()`.
    #[error("gave up after {attempts} failed connection attempts")]
    RetriesExhausted { attempts: u32 },
}

impl ConnectError {
    /// Returns true if no further automatic retries will happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectError::RetriesExhausted { .. })
    }
}

impl From<ConnectError> for DomainError {
    fn from(err: ConnectError) -> Self {
        let terminal = err.is_terminal();
        let domain = DomainError::new(ErrorCode::ConnectionError, err.to_string());
        if terminal {
            // Lets callers that only see DomainError tell a dead backend
            // apart from a transient dial failure.
            domain.with_detail("retries_exhausted", "true")
        } else {
            domain
        }
    }
}

/// Point-in-time snapshot of the supervisor, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub attempts: u32,
    /// True once the retry budget is spent and automatic retries stopped.
    pub exhausted: bool,
}

struct Inner<T> {
    state: ConnectionState,
    connection: Option<T>,
    attempts: u32,
    exhausted: bool,
    has_connected: bool,
}

impl<T> Inner<T> {
    fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            connection: None,
            attempts: 0,
            exhausted: false,
            has_connected: false,
        }
    }
}

/// Connection state machine with lazy connect, exponential backoff
/// reconnection, and a single-flight guard.
pub struct RetrySupervisor<C: Connector> {
    label: &'static str,
    connector: Arc<C>,
    policy: BackoffPolicy,
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<Inner<C::Connection>>>,
    // Serializes connect attempts; held across the dial await.
    connect_gate: Arc<Mutex<()>>,
}

impl<C: Connector> Clone for RetrySupervisor<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            connector: Arc::clone(&self.connector),
            policy: self.policy.clone(),
            clock: Arc::clone(&self.clock),
            inner: Arc::clone(&self.inner),
            connect_gate: Arc::clone(&self.connect_gate),
        }
    }
}

impl<C: Connector> RetrySupervisor<C> {
    /// Creates a supervisor for the given backend.
    ///
    /// `label` names the backend in log lines (e.g. "cache", "broker").
    pub fn new(
        label: &'static str,
        connector: C,
        policy: BackoffPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            label,
            connector: Arc::new(connector),
            policy,
            clock,
            inner: Arc::new(Mutex::new(Inner::new())),
            connect_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the live connection, dialing lazily if needed.
    ///
    /// Does not start a second attempt while one is in flight. Once the
    /// retry budget is spent this returns `ConnectError::RetriesExhausted`
    /// without touching the backend.
    pub async fn ensure_connection(&self) -> Result<C::Connection, ConnectError> {
        {
            let inner = self.inner.lock().await;
            if inner.state.is_connected() {
                if let Some(conn) = &inner.connection {
                    return Ok(conn.clone());
                }
            }
            if inner.exhausted {
                return Err(ConnectError::RetriesExhausted {
                    attempts: inner.attempts,
                });
            }
        }
        self.try_connect(false).await
    }

    /// Manually triggers a connect attempt.
    ///
    /// This is the one path that restarts the cycle after the supervisor
    /// has given up. The attempt counter is not reset here; it resets only
    /// on a successful connection.
    pub async fn connect(&self) -> Result<C::Connection, ConnectError> {
        self.try_connect(true).await
    }

    /// Drops the held connection so the next use reconnects.
    ///
    /// Called by clients when an operation fails in a way that indicates
    /// the connection itself died.
    pub async fn mark_disconnected(&self) {
        let mut inner = self.inner.lock().await;
        if inner.connection.is_some() || inner.state.is_connected() {
            tracing::warn!(backend = self.label, "Connection lost; will reconnect on next use");
        }
        inner.connection = None;
        inner.state = ConnectionState::Disconnected;
    }

    /// Drops the connection and stops the client for good.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.connection = None;
        inner.state = ConnectionState::Disconnected;
        tracing::info!(backend = self.label, "Connection closed");
    }

    /// Returns a snapshot of the current state and attempt counter.
    pub async fn status(&self) -> ConnectionStatus {
        let inner = self.inner.lock().await;
        ConnectionStatus {
            state: inner.state,
            attempts: inner.attempts,
            exhausted: inner.exhausted,
        }
    }

    /// Returns true if a connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.state.is_connected()
    }

    async fn try_connect(&self, manual: bool) -> Result<C::Connection, ConnectError> {
        let _gate = self.connect_gate.lock().await;

        // Re-check under the gate: another caller may have finished the
        // dial while we waited.
        {
            let mut inner = self.inner.lock().await;
            if inner.state.is_connected() {
                if let Some(conn) = &inner.connection {
                    return Ok(conn.clone());
                }
            }
            if inner.exhausted {
                if !manual {
                    return Err(ConnectError::RetriesExhausted {
                        attempts: inner.attempts,
                    });
                }
                tracing::info!(
                    backend = self.label,
                    attempts = inner.attempts,
                    "Manual reconnect requested after giving up"
                );
                inner.exhausted = false;
            }
            inner.state = if inner.has_connected || inner.attempts > 0 {
                ConnectionState::Reconnecting
            } else {
                ConnectionState::Connecting
            };
        }

        match self.connector.connect().await {
            Ok(conn) => {
                let mut inner = self.inner.lock().await;
                inner.connection = Some(conn.clone());
                inner.state = ConnectionState::Connected;
                // Attempt counter resets only here, on success
                inner.attempts = 0;
                inner.has_connected = true;
                tracing::info!(backend = self.label, "Connected");
                Ok(conn)
            }
            Err(err) => {
                let mut inner = self.inner.lock().await;
                inner.connection = None;
                inner.attempts += 1;
                let attempts = inner.attempts;

                if self.policy.is_exhausted(attempts) {
                    inner.exhausted = true;
                    inner.state = ConnectionState::Disconnected;
                    tracing::error!(
                        backend = self.label,
                        attempts,
                        error = %err,
                        "Max connection attempts reached; giving up"
                    );
                    return Err(ConnectError::RetriesExhausted { attempts });
                }

                inner.state = ConnectionState::Reconnecting;
                drop(inner);

                let delay = self.policy.delay_for(attempts - 1);
                tracing::warn!(
                    backend = self.label,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Connection attempt failed; retry scheduled"
                );
                self.schedule_retry(delay);

                Err(ConnectError::AttemptFailed {
                    attempt: attempts,
                    message: err.message,
                })
            }
        }
    }

    fn schedule_retry(&self, delay: Duration) {
        let supervisor = self.clone();
        tokio::spawn(async move {
            supervisor.clock.sleep(delay).await;
            if let Err(err) = supervisor.try_connect(false).await {
                tracing::debug!(
                    backend = supervisor.label,
                    error = %err,
                    "Scheduled reconnect attempt did not succeed"
                );
            }
        });
    }
}
