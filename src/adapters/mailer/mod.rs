//! Mailer adapters.
//!
//! Implementations of the `Mailer` port:
//! - `LogMailer` - Logs sends with a simulated provider delay (default)
//! - `RecordingMailer` - Captures sends for test assertions

mod log;
mod recording;

pub use log::LogMailer;
pub use recording::{RecordingMailer, SentEmail};
