//! Connection resilience: state tracking, exponential backoff, and the
//! retry supervisor that the cache and queue clients are built on.

pub mod backoff;
pub mod clock;
pub mod state;
pub mod supervisor;

pub use backoff::BackoffPolicy;
pub use clock::{Clock, ManualClock, SystemClock};
pub use state::ConnectionState;
pub use supervisor::{
    ConnectError, ConnectionStatus, Connector, ConnectorError, RetrySupervisor,
};
