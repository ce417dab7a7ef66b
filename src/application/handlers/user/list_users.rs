//! ListUsersHandler - Query handler for the admin account listing.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Role};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// Query for the full account listing.
#[derive(Debug, Clone)]
pub struct ListUsersQuery {
    /// Role of the requesting account.
    pub role: Role,
}

/// Result of the account listing.
#[derive(Debug, Clone)]
pub struct ListUsersResult {
    pub users: Vec<User>,
}

/// Handler for listing every account.
///
/// The HTTP layer already gates the route behind the admin role; the
/// check here keeps the rule enforced for any other caller.
pub struct ListUsersHandler {
    users: Arc<dyn UserRepository>,
}

impl ListUsersHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, query: ListUsersQuery) -> Result<ListUsersResult, DomainError> {
        if !query.role.is_admin() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Admin access required",
            ));
        }

        let users = self.users.list_all().await?;
        Ok(ListUsersResult { users })
    }
}
