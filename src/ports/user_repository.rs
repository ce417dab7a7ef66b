//! User repository port.
//!
//! Defines the contract for persisting and retrieving User aggregates.
//! Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **Email-keyed lookups**: Login and duplicate checks go through email
//! - **Case handling**: Emails are stored normalized; callers pass them
//!   already lowercased

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::User;
use async_trait::async_trait;

/// Repository port for User aggregate persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save a new account.
    ///
    /// # Errors
    ///
    /// - `DuplicateEmail` if the email is already registered
    /// - `DatabaseError` on persistence failure
    async fn save(&self, user: &User) -> Result<(), DomainError>;

    /// Find an account by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Find an account by normalized email.
    ///
    /// Returns `None` if not found.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Check whether an email is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError>;

    /// List every account, newest first (admin listing).
    async fn list_all(&self) -> Result<Vec<User>, DomainError>;
}
