//! Mailer port - Interface for sending account emails.
//!
//! The consumer service reacts to registration events by sending a welcome
//! email through this port. Implementations may talk to a real provider or
//! just log (the default in this repo).

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for sending the welcome email after registration.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a welcome email to a freshly registered account.
    ///
    /// # Errors
    ///
    /// - `InternalError` if the provider rejects the send; the caller
    ///   decides whether to requeue
    async fn send_welcome_email(&self, email: &str, name: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn mailer_is_object_safe() {
        fn _accepts_dyn(_mailer: &dyn Mailer) {}
    }
}
