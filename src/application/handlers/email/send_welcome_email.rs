//! SendWelcomeEmailHandler - Event handler for registration events.
//!
//! The consumer service registers this handler on the registration queue.
//! Failures propagate so the queue client requeues the event; delivery is
//! at-least-once and the mailer tolerates repeats.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::domain::user::UserRegistered;
use crate::ports::{EventHandler, Mailer};

/// Sends the welcome email for each registration event.
pub struct SendWelcomeEmailHandler {
    mailer: Arc<dyn Mailer>,
}

impl SendWelcomeEmailHandler {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl EventHandler for SendWelcomeEmailHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let registration: UserRegistered = event.payload_as().map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Malformed registration payload: {}", e),
            )
        })?;

        debug!(
            user_id = %registration.user_id,
            email = %registration.email,
            "Processing registration event"
        );

        self.mailer
            .send_welcome_email(&registration.email, &registration.name)
            .await
    }

    fn name(&self) -> &'static str {
        "send-welcome-email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mailer::RecordingMailer;
    use crate::domain::foundation::{Role, Timestamp};
    use crate::domain::user::User;

    fn registration_envelope() -> EventEnvelope {
        let user = User::register(
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "$2b$12$hash".to_string(),
            Role::User,
            Timestamp::from_unix_secs(1704326400),
        )
        .unwrap();
        EventEnvelope::from_event(&UserRegistered::from_user(&user))
    }

    #[tokio::test]
    async fn sends_welcome_email_for_registration_event() {
        let mailer = Arc::new(RecordingMailer::new());
        let handler = SendWelcomeEmailHandler::new(mailer.clone());

        handler.handle(registration_envelope()).await.unwrap();

        let sent = mailer.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "alice@example.com");
        assert_eq!(sent[0].name, "Alice");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_serialization_error() {
        let mailer = Arc::new(RecordingMailer::new());
        let handler = SendWelcomeEmailHandler::new(mailer.clone());

        let envelope = EventEnvelope::new(
            "user.registered.v1",
            "entity-1",
            serde_json::json!({"unexpected": true}),
        );
        let err = handler.handle(envelope).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SerializationError);
        assert_eq!(mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn mailer_failure_propagates_for_requeue() {
        let mailer = Arc::new(RecordingMailer::new());
        mailer.fail_with(DomainError::new(
            ErrorCode::InternalError,
            "provider down",
        ));
        let handler = SendWelcomeEmailHandler::new(mailer);

        let err = handler.handle(registration_envelope()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
