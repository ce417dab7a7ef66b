//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserRepository` - User aggregate persistence
//! - `RecordRepository` - Data record persistence
//!
//! ## Infrastructure Ports
//!
//! - `Cache` - Best-effort key/value cache (failures swallowed)
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventHandler` - Port for reacting to delivered events
//!
//! ## Auth Ports
//!
//! - `PasswordHasher` - Credential hashing
//! - `TokenService` - Bearer-token issuance and verification
//!
//! ## Notification Ports
//!
//! - `Mailer` - Welcome email delivery on the consumer side

mod cache;
mod event_publisher;
mod mailer;
mod password_hasher;
mod record_repository;
mod token_service;
mod user_repository;

pub use cache::{data_key, namespaced_key, session_key, user_key, Cache, CacheHealth};
pub use event_publisher::{EventHandler, EventPublisher};
pub use mailer::Mailer;
pub use password_hasher::PasswordHasher;
pub use record_repository::RecordRepository;
pub use token_service::{AuthClaims, TokenService};
pub use user_repository::UserRepository;
