//! Email application handlers.
//!
//! Event handlers run by the consumer service.

mod send_welcome_email;

pub use send_welcome_email::SendWelcomeEmailHandler;
