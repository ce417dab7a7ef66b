//! Connection lifecycle states shared by the cache and queue clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a managed backend connection.
///
/// ## Transitions
///
/// ```text
/// Disconnected --[first connect]--> Connecting
/// Connecting --[success]--> Connected
/// Connecting --[failure]--> Reconnecting
/// Connected --[connection lost]--> Disconnected
/// Reconnecting --[retry succeeds]--> Connected
/// Reconnecting --[retry fails, attempts left]--> Reconnecting
/// Reconnecting --[attempts exhausted]--> Disconnected (terminal until manual connect)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and no attempt in progress.
    #[default]
    Disconnected,

    /// First connection attempt in progress.
    Connecting,

    /// Connection established and usable.
    Connected,

    /// Connection lost or never established; retry cycle in progress.
    Reconnecting,
}

impl ConnectionState {
    /// Returns true if the connection is usable.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Returns true if a connect attempt is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Reconnecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        };
        write!(f, "{}", s)
    }
}
