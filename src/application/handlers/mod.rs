//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod email;
pub mod record;
pub mod user;

pub use email::SendWelcomeEmailHandler;
pub use record::{
    CreateRecordCommand, CreateRecordHandler, CreateRecordResult, GetRecordHandler,
    GetRecordQuery, GetRecordResult, ListRecordsHandler, ListRecordsQuery, ListRecordsResult,
};
pub use user::{
    ListUsersHandler, ListUsersQuery, ListUsersResult, LoginUserCommand, LoginUserHandler,
    LoginUserResult, RegisterUserCommand, RegisterUserHandler, RegisterUserResult,
};
