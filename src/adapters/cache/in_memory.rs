//! In-memory cache implementation for tests and single-process development.
//!
//! Implements the same contract as the Redis-backed cache, including the
//! raw-string fallback on `get` and the TTL <= 0 means permanent rule.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::resilience::ConnectionState;
use crate::ports::{Cache, CacheHealth};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// HashMap-backed cache with per-entry expiry.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, key: &str, value: String, ttl_secs: i64) {
        let expires_at = if ttl_secs > 0 {
            Some(Instant::now() + Duration::from_secs(ttl_secs as u64))
        } else {
            None
        };
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), Entry { value, expires_at });
    }

    /// Reads a live entry, dropping it if expired.
    fn read(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }
}

/// Glob matcher for KEYS patterns: `*` matches any run, `?` one character.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    // dp[i][j]: pattern[..i] matches text[..j]
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;
    for i in 1..=p.len() {
        if p[i - 1] == '*' {
            dp[i][0] = dp[i - 1][0];
        }
    }
    for i in 1..=p.len() {
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                '*' => dp[i - 1][j] || dp[i][j - 1],
                '?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }
    dp[p.len()][t.len()]
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<JsonValue> {
        let raw = self.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(_) => Some(JsonValue::String(raw)),
        }
    }

    async fn set(&self, key: &str, value: &JsonValue, ttl_secs: i64) {
        let text = match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.store(key, text, ttl_secs);
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    async fn exists(&self, key: &str) -> bool {
        self.read(key).is_some()
    }

    async fn incr(&self, key: &str) -> Option<i64> {
        let current = match self.read(key) {
            Some(raw) => raw.parse::<i64>().ok()?,
            None => 0,
        };
        let next = current + 1;
        self.store(key, next.to_string(), 0);
        Some(next)
    }

    async fn decr(&self, key: &str) -> Option<i64> {
        let current = match self.read(key) {
            Some(raw) => raw.parse::<i64>().ok()?,
            None => 0,
        };
        let next = current - 1;
        self.store(key, next.to_string(), 0);
        Some(next)
    }

    async fn expire(&self, key: &str, ttl_secs: i64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = if ttl_secs > 0 {
                Some(Instant::now() + Duration::from_secs(ttl_secs as u64))
            } else {
                None
            };
        }
    }

    async fn ttl(&self, key: &str) -> i64 {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expired() => -2,
            Some(Entry {
                expires_at: Some(deadline),
                ..
            }) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let mut secs = remaining.as_secs() as i64;
                if remaining.subsec_nanos() > 0 {
                    secs += 1;
                }
                secs
            }
            Some(_) => -1,
            None => -2,
        }
    }

    async fn keys(&self, pattern: &str) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|(key, entry)| !entry.expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    async fn flush_all(&self) {
        self.entries.lock().unwrap().clear();
    }

    async fn status(&self) -> CacheHealth {
        CacheHealth {
            state: ConnectionState::Connected,
            attempts: 0,
        }
    }

    async fn health_check(&self) -> bool {
        self.store("health:probe", "ok".to_string(), 10);
        self.read("health:probe").as_deref() == Some("ok")
    }
}
