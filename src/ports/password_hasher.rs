//! PasswordHasher port - Interface for credential hashing.
//!
//! Keeps the hashing scheme out of the application layer so handlers can
//! be tested with a cheap fake instead of a real KDF.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for hashing and verifying passwords.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password for storage.
    async fn hash(&self, raw: &str) -> Result<String, DomainError>;

    /// Verify a raw password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only on hash-format or
    /// provider failures.
    async fn verify(&self, raw: &str, hash: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn password_hasher_is_object_safe() {
        fn _accepts_dyn(_hasher: &dyn PasswordHasher) {}
    }
}
