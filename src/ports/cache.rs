//! Cache port - best-effort key/value cache contract.
//!
//! The cache is an optimization, never a source of truth. Every method on
//! this trait swallows backend failures and returns a safe default (miss,
//! false, -2, empty list) so callers stay correct with the cache fully
//! unavailable. Implementations log the underlying error instead of
//! propagating it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{RecordId, UserId};
use crate::domain::resilience::ConnectionState;

/// Connection snapshot for the cache backend, reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub state: ConnectionState,
    pub attempts: u32,
}

/// Port for the best-effort cache.
///
/// Contract details:
/// - `get` returns `None` on a miss and on any backend failure. A stored
///   value that is not valid JSON comes back as a JSON string (raw
///   fallback).
/// - `set` stores strings verbatim and serializes everything else to
///   JSON text. `ttl_secs > 0` sets an expiring entry; zero or negative
///   stores it permanently.
/// - `incr`/`decr` treat an absent key as 0 and return the new value.
/// - `ttl` returns -2 for an absent key (and on failure), -1 for a key
///   without expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<JsonValue>;

    async fn set(&self, key: &str, value: &JsonValue, ttl_secs: i64);

    async fn delete(&self, key: &str);

    async fn exists(&self, key: &str) -> bool;

    async fn incr(&self, key: &str) -> Option<i64>;

    async fn decr(&self, key: &str) -> Option<i64>;

    async fn expire(&self, key: &str, ttl_secs: i64);

    async fn ttl(&self, key: &str) -> i64;

    async fn keys(&self, pattern: &str) -> Vec<String>;

    async fn flush_all(&self);

    /// Connection state and retry counter for observability. Does not
    /// touch the backend.
    async fn status(&self) -> CacheHealth;

    /// Round-trips a probe key. True only if the backend stored the probe
    /// and handed it back.
    async fn health_check(&self) -> bool;
}

/// Builds a namespaced cache key (`prefix:id`).
pub fn namespaced_key(prefix: &str, id: &str) -> String {
    format!("{prefix}:{id}")
}

/// Cache key for a data record.
pub fn data_key(id: RecordId) -> String {
    namespaced_key("data", &id.to_string())
}

/// Cache key for a user.
pub fn user_key(id: UserId) -> String {
    namespaced_key("user", &id.to_string())
}

/// Cache key for a session token.
pub fn session_key(token: &str) -> String {
    namespaced_key("session", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn cache_is_object_safe() {
        fn _accepts_dyn(_cache: &dyn Cache) {}
    }

    #[test]
    fn test_key_helpers_use_prefixes() {
        let record = RecordId::new();
        let user = UserId::new();

        assert_eq!(data_key(record), format!("data:{record}"));
        assert_eq!(user_key(user), format!("user:{user}"));
        assert_eq!(session_key("abc123"), "session:abc123");
    }
}
