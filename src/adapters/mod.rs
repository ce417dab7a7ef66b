//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT token signing and bcrypt password hashing
//! - `broker` - Queue client over Redis Streams (in-memory double for tests)
//! - `cache` - Best-effort cache over Redis (in-memory double for tests)
//! - `events` - Event publishers and the envelope-decoding consumer
//! - `http` - REST API (axum)
//! - `mailer` - Welcome email delivery
//! - `postgres` - Repository implementations
//! - `redis` - Shared Redis connection plumbing

pub mod auth;
pub mod broker;
pub mod cache;
pub mod events;
pub mod http;
pub mod mailer;
pub mod postgres;
pub mod redis;

pub use auth::{BcryptPasswordHasher, JwtTokenService};
pub use broker::{InMemoryTransport, QueueClient, RedisStreamsTransport};
pub use cache::{InMemoryCache, RedisCacheClient};
pub use events::{EnvelopeConsumer, QueueEventPublisher, RecordingEventPublisher};
pub use mailer::{LogMailer, RecordingMailer};
pub use postgres::{PostgresRecordRepository, PostgresUserRepository};
pub use self::redis::RedisConnector;
