//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Datadock domain.

mod errors;
mod events;
mod ids;
mod role;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{domain_event, DomainEvent, EventEnvelope, EventId};
pub use ids::{RecordId, UserId};
pub use role::Role;
pub use timestamp::Timestamp;
