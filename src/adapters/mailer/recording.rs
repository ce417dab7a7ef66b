//! Recording mailer for testing.
//!
//! Captures every send for assertions instead of delivering anything.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in
//! production. It uses `.expect()` on lock operations which will panic if
//! locks are poisoned. Production code should use the log mailer or a
//! real provider adapter.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::Mailer;

/// One captured welcome-email send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub email: String,
    /// Recipient display name.
    pub name: String,
}

/// Recording mailer for testing.
///
/// Features:
/// - Send capture for assertions
/// - Optional forced failure, for exercising requeue paths
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct RecordingMailer {
    sent: RwLock<Vec<SentEmail>>,
    failure: RwLock<Option<DomainError>>,
}

impl RecordingMailer {
    /// Creates a new empty mailer.
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// Makes every subsequent send fail with the given error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_with(&self, error: DomainError) {
        *self
            .failure
            .write()
            .expect("RecordingMailer: failure write lock poisoned") = Some(error);
    }

    /// Clears a forced failure so later sends succeed again.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn recover(&self) {
        *self
            .failure
            .write()
            .expect("RecordingMailer: failure write lock poisoned") = None;
    }

    // === Test Helpers ===

    /// Returns all captured sends (for test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.sent
            .read()
            .expect("RecordingMailer: sent lock poisoned")
            .clone()
    }

    /// Returns the number of captured sends.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sent_count(&self) -> usize {
        self.sent
            .read()
            .expect("RecordingMailer: sent lock poisoned")
            .len()
    }

    /// Returns true if a send to the given address was captured.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn has_sent_to(&self, email: &str) -> bool {
        self.sent
            .read()
            .expect("RecordingMailer: sent lock poisoned")
            .iter()
            .any(|s| s.email == email)
    }

    /// Clears all captured sends.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.sent
            .write()
            .expect("RecordingMailer: sent lock poisoned")
            .clear();
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_welcome_email(&self, email: &str, name: &str) -> Result<(), DomainError> {
        let forced = self
            .failure
            .read()
            .expect("RecordingMailer: failure read lock poisoned")
            .clone();
        if let Some(error) = forced {
            return Err(error);
        }

        self.sent
            .write()
            .expect("RecordingMailer: sent lock poisoned")
            .push(SentEmail {
                email: email.to_string(),
                name: name.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[tokio::test]
    async fn captures_sends_in_order() {
        let mailer = RecordingMailer::new();

        mailer
            .send_welcome_email("a@example.com", "Ann")
            .await
            .unwrap();
        mailer
            .send_welcome_email("b@example.com", "Ben")
            .await
            .unwrap();

        let sent = mailer.sent_emails();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].email, "a@example.com");
        assert_eq!(sent[1].name, "Ben");
        assert!(mailer.has_sent_to("b@example.com"));
        assert!(!mailer.has_sent_to("c@example.com"));
    }

    #[tokio::test]
    async fn forced_failure_is_returned_and_nothing_recorded() {
        let mailer = RecordingMailer::new();
        mailer.fail_with(DomainError::new(
            ErrorCode::InternalError,
            "provider down",
        ));

        let result = mailer.send_welcome_email("a@example.com", "Ann").await;

        assert!(result.is_err());
        assert_eq!(mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn recover_clears_a_forced_failure() {
        let mailer = RecordingMailer::new();
        mailer.fail_with(DomainError::new(
            ErrorCode::InternalError,
            "provider down",
        ));
        mailer.recover();

        mailer
            .send_welcome_email("a@example.com", "Ann")
            .await
            .unwrap();

        assert_eq!(mailer.sent_count(), 1);
    }

    #[tokio::test]
    async fn clear_resets_captured_sends() {
        let mailer = RecordingMailer::new();
        mailer
            .send_welcome_email("a@example.com", "Ann")
            .await
            .unwrap();

        mailer.clear();

        assert_eq!(mailer.sent_count(), 0);
    }
}
