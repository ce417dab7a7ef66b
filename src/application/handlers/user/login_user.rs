//! LoginUserHandler - Command handler for credential login.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::User;
use crate::ports::{PasswordHasher, TokenService, UserRepository};

/// Command to exchange credentials for a bearer token.
#[derive(Clone)]
pub struct LoginUserCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginUserCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginUserResult {
    pub token: String,
    pub user: User,
}

/// Handler for credential login.
pub struct LoginUserHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl LoginUserHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: LoginUserCommand) -> Result<LoginUserResult, DomainError> {
        // 1. Look up the account. An unknown email answers exactly like a bad
        //    password so the endpoint cannot be used to enumerate accounts.
        let email = cmd.email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(invalid_credentials());
        };

        // 2. Check the password against the stored hash
        if !self.hasher.verify(&cmd.password, user.password_hash()).await? {
            return Err(invalid_credentials());
        }

        // 3. Issue a bearer token
        let token = self.tokens.issue(&user).await?;

        info!(email = %user.email(), "User logged in successfully");

        Ok(LoginUserResult { token, user })
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
}
