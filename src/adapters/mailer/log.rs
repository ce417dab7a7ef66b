//! Log-only mailer.
//!
//! Stands in for a real email provider: logs the send, waits out a
//! simulated provider round-trip, logs the completion. The consumer
//! binary wires this in so the whole registration pipeline can run
//! without SMTP credentials.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::DomainError;
use crate::ports::Mailer;

/// How long the stand-in provider "takes" to deliver an email.
const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_secs(1);

/// Mailer that writes to the log instead of sending anything.
///
/// The artificial delivery delay keeps the consumer's sequential
/// processing observable in local runs; set it to zero in tests.
#[derive(Debug, Clone)]
pub struct LogMailer {
    delivery_delay: Duration,
}

impl LogMailer {
    /// Creates a mailer with the default simulated delivery delay.
    pub fn new() -> Self {
        Self {
            delivery_delay: DEFAULT_DELIVERY_DELAY,
        }
    }

    /// Overrides the simulated delivery delay.
    pub fn with_delay(delivery_delay: Duration) -> Self {
        Self { delivery_delay }
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_welcome_email(&self, email: &str, name: &str) -> Result<(), DomainError> {
        info!(email = %email, name = %name, "Sending welcome email");

        if !self.delivery_delay.is_zero() {
            tokio::time::sleep(self.delivery_delay).await;
        }

        info!(email = %email, "Welcome email sent");
        Ok(())
    }
}
