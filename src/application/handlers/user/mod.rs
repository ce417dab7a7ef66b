//! User application handlers.
//!
//! Command and query handlers for registration, login, and the admin
//! account listing.

mod list_users;
mod login_user;
mod register_user;

pub use list_users::{ListUsersHandler, ListUsersQuery, ListUsersResult};
pub use login_user::{LoginUserCommand, LoginUserHandler, LoginUserResult};
pub use register_user::{RegisterUserCommand, RegisterUserHandler, RegisterUserResult};
