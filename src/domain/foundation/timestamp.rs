//! Timestamp value object.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, always UTC, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wraps a `DateTime<Utc>`, used when reading stored rows.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// The inner datetime, used when binding query parameters.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Builds a timestamp from Unix seconds.
    ///
    /// Mainly for fixed fixtures in tests.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(Utc.timestamp_opt(secs as i64, 0).unwrap())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
