//! Message broker adapters.
//!
//! [`QueueClient`] carries the message semantics (JSON bodies, ack on
//! success, requeue on failure) and runs over any [`BrokerTransport`]:
//! Redis Streams in production, an in-memory double in tests.

mod client;
mod in_memory;
mod redis_streams;
mod transport;

pub use client::{ConsumeOutcome, MessageHandler, QueueClient};
pub use in_memory::InMemoryTransport;
pub use redis_streams::RedisStreamsTransport;
pub use transport::{BrokerHealth, BrokerTransport, DeliveryTag, QueueStatus, RawDelivery};
