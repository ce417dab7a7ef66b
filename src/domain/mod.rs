//! Business rules, independent of transport and storage.
//!
//! - `foundation` - value objects, identifiers, events, and error types
//! - `resilience` - connection state machine, backoff, retry supervisor
//! - `user` - the account aggregate and its registration rules
//! - `record` - the data record aggregate and its visibility rules

pub mod foundation;
pub mod record;
pub mod resilience;
pub mod user;
