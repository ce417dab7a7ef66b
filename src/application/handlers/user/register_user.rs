//! RegisterUserHandler - Command handler for account registration.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{
    DomainError, ErrorCode, EventEnvelope, Role, Timestamp,
};
use crate::domain::user::{validate_password, User, UserRegistered};
use crate::ports::{EventPublisher, PasswordHasher, UserRepository};

/// Command to register a new account.
#[derive(Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// Result of successful registration.
#[derive(Debug, Clone)]
pub struct RegisterUserResult {
    pub user: User,
    pub event: UserRegistered,
}

/// Handler for account registration.
pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    publisher: Arc<dyn EventPublisher>,
}

impl RegisterUserHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            users,
            hasher,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<RegisterUserResult, DomainError> {
        // 1. Validate the raw password before paying for a hash
        validate_password(&cmd.password)?;

        // 2. Reject duplicate emails up front; the unique index backstops races
        let email = cmd.email.trim().to_lowercase();
        if self.users.email_exists(&email).await? {
            return Err(DomainError::new(
                ErrorCode::DuplicateEmail,
                format!("User already exists with email: {}", email),
            ));
        }

        // 3. Hash the credentials
        let password_hash = self.hasher.hash(&cmd.password).await?;

        // 4. Create the aggregate
        let user = User::register(email, cmd.name, password_hash, cmd.role, Timestamp::now())?;

        // 5. Persist
        self.users.save(&user).await?;

        // 6. Publish the registration event. Delivery failure never fails the
        //    request; the account is already stored.
        let event = UserRegistered::from_user(&user);
        if let Err(err) = self.publisher.publish(EventEnvelope::from_event(&event)).await {
            warn!(
                user_id = %user.id(),
                error = %err,
                "Failed to publish registration event"
            );
        }

        info!(email = %user.email(), role = %user.role(), "User registered successfully");

        Ok(RegisterUserResult { user, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::RecordingEventPublisher;
    use crate::domain::foundation::UserId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockUserRepository {
        saved: Mutex<Vec<User>>,
        taken_email: Option<String>,
        fail_save: bool,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                taken_email: None,
                fail_save: false,
            }
        }

        fn with_taken_email(email: &str) -> Self {
            Self {
                taken_email: Some(email.to_string()),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail_save: true,
                ..Self::new()
            }
        }

        fn saved(&self) -> Vec<User> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn save(&self, user: &User) -> Result<(), DomainError> {
            if self.fail_save {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Simulated save failure",
                ));
            }
            self.saved.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
            Ok(self.taken_email.as_deref() == Some(email))
        }

        async fn list_all(&self) -> Result<Vec<User>, DomainError> {
            Ok(vec![])
        }
    }

    struct FakePasswordHasher;

    #[async_trait]
    impl PasswordHasher for FakePasswordHasher {
        async fn hash(&self, raw: &str) -> Result<String, DomainError> {
            Ok(format!("hashed:{}", raw))
        }

        async fn verify(&self, raw: &str, hash: &str) -> Result<bool, DomainError> {
            Ok(hash == format!("hashed:{}", raw))
        }
    }

    fn handler(
        repo: Arc<MockUserRepository>,
        publisher: Arc<RecordingEventPublisher>,
    ) -> RegisterUserHandler {
        RegisterUserHandler::new(repo, Arc::new(FakePasswordHasher), publisher)
    }

    fn command(email: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            email: email.to_string(),
            password: "hunter22".to_string(),
            name: "Alice".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn registers_account_with_hashed_password() {
        let repo = Arc::new(MockUserRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo.clone(), publisher);

        let result = handler.handle(command("alice@example.com")).await.unwrap();

        assert_eq!(result.user.email(), "alice@example.com");
        assert_eq!(result.user.password_hash(), "hashed:hunter22");
        assert_eq!(repo.saved().len(), 1);
    }

    #[tokio::test]
    async fn publishes_registration_event() {
        let repo = Arc::new(MockUserRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo, publisher.clone());

        let result = handler.handle(command("alice@example.com")).await.unwrap();

        let events = publisher.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "user.registered.v1");
        assert_eq!(events[0].entity_id, result.user.id().to_string());
        assert_eq!(result.event.email, "alice@example.com");
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let repo = Arc::new(MockUserRepository::with_taken_email("alice@example.com"));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo.clone(), publisher.clone());

        let err = handler.handle(command("alice@example.com")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateEmail);
        assert!(repo.saved().is_empty());
        assert_eq!(publisher.event_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_check_uses_normalized_email() {
        let repo = Arc::new(MockUserRepository::with_taken_email("alice@example.com"));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo, publisher);

        let err = handler
            .handle(command("  Alice@EXAMPLE.com "))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateEmail);
    }

    #[tokio::test]
    async fn rejects_short_password() {
        let repo = Arc::new(MockUserRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo.clone(), publisher);

        let mut cmd = command("alice@example.com");
        cmd.password = "123".to_string();
        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(repo.saved().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_registration() {
        let repo = Arc::new(MockUserRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        publisher.fail_with(DomainError::new(ErrorCode::QueueError, "broker down"));
        let handler = handler(repo.clone(), publisher);

        let result = handler.handle(command("alice@example.com")).await;

        assert!(result.is_ok());
        assert_eq!(repo.saved().len(), 1);
    }

    #[tokio::test]
    async fn save_failure_publishes_nothing() {
        let repo = Arc::new(MockUserRepository::failing());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = handler(repo, publisher.clone());

        let err = handler.handle(command("alice@example.com")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(publisher.event_count(), 0);
    }

    #[test]
    fn debug_redacts_the_password() {
        let rendered = format!("{:?}", command("alice@example.com"));
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("<redacted>"));
    }
}
