//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresUserRepository` - User accounts with unique-email enforcement
//! - `PostgresRecordRepository` - Data records with visibility-scoped listings

mod record_repository;
mod user_repository;

pub use record_repository::PostgresRecordRepository;
pub use user_repository::PostgresUserRepository;
