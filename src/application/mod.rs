//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // User handlers
    ListUsersHandler, ListUsersQuery, ListUsersResult,
    LoginUserCommand, LoginUserHandler, LoginUserResult,
    RegisterUserCommand, RegisterUserHandler, RegisterUserResult,
    // Record handlers
    CreateRecordCommand, CreateRecordHandler, CreateRecordResult,
    GetRecordHandler, GetRecordQuery, GetRecordResult,
    ListRecordsHandler, ListRecordsQuery, ListRecordsResult,
    // Consumer-side handlers
    SendWelcomeEmailHandler,
};
