//! Cache adapters implementing the `Cache` port.
//!
//! - `RedisCacheClient` - Production Redis-backed cache with lazy
//!   reconnect and error swallowing
//! - `InMemoryCache` - HashMap-backed cache for tests and local runs

mod in_memory;
mod redis;

pub use self::redis::RedisCacheClient;
pub use in_memory::InMemoryCache;
