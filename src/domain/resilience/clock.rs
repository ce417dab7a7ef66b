//! Clock abstraction so retry scheduling is testable without real time.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Port for time-dependent behavior in the retry supervisor.
///
/// Production code uses [`SystemClock`]; tests use [`ManualClock`] to make
/// backoff sequencing deterministic and instantaneous.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Sleeps for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer.
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock for tests.
///
/// Records every requested sleep and returns immediately, so retry chains
/// complete in microseconds while the requested delays remain observable.
#[derive(Debug, Default)]
pub struct ManualClock {
    requested: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sleep durations requested so far, in order.
    pub fn requested_sleeps(&self) -> Vec<Duration> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.requested.lock().unwrap().push(duration);
        // Yield so spawned retry tasks interleave the way timer-driven ones do
        tokio::task::yield_now().await;
    }
}
