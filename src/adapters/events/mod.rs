//! Event publishing and consuming adapters.
//!
//! Implementations of the `EventPublisher` port for different
//! environments, plus the consumer-side bridge:
//!
//! - `QueueEventPublisher` - Broker-backed delivery to other processes
//! - `RecordingEventPublisher` - In-process capture for testing
//! - `EnvelopeConsumer` - Decodes queue deliveries for `EventHandler`s

mod envelope_consumer;
mod in_memory;
mod queue_publisher;

pub use envelope_consumer::EnvelopeConsumer;
pub use in_memory::RecordingEventPublisher;
pub use queue_publisher::QueueEventPublisher;
