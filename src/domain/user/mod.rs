//! User aggregate: registration, credentials, and role-based access.

pub mod events;

pub use events::UserRegistered;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Role, Timestamp, UserId, ValidationError};

/// Minimum accepted password length, enforced before hashing.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validates a raw (unhashed) password against the registration rules.
///
/// Kept separate from the aggregate because the aggregate only ever sees
/// the hash.
pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::empty_field("password"));
    }
    if raw.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::too_short(
            "password",
            MIN_PASSWORD_LENGTH,
            raw.chars().count(),
        ));
    }
    Ok(())
}

fn email_is_well_formed(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.len() > 2
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

/// A registered account.
///
/// The aggregate never holds a raw password; callers hash before
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    password_hash: String,
    role: Role,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl User {
    /// Creates a new account from validated registration input.
    ///
    /// The email is trimmed and lowercased so lookups are case-insensitive.
    pub fn register(
        email: String,
        name: String,
        password_hash: String,
        role: Role,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email_is_well_formed(&email) {
            return Err(ValidationError::invalid_format(
                "email",
                "expected an address like name@example.com",
            ));
        }

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name,
            password_hash,
            role,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Rebuilds an account from stored fields without re-validating.
    pub fn from_storage(
        id: UserId,
        email: String,
        name: String,
        password_hash: String,
        role: Role,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password_hash,
            role,
            created_at,
            updated_at,
        }
    }

    // Getters
    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
