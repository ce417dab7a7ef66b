//! The error vocabulary shared by every layer.
//!
//! [`ValidationError`] is returned by value object and entity constructors;
//! it names the offending field so callers never have to guess. Everything
//! above the domain speaks [`DomainError`], a code plus message plus
//! free-form details, which the HTTP layer maps onto status codes and the
//! worker maps onto requeue decisions.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Rejection from a domain constructor.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: String },

    #[error("{field} must be at least {min} characters (got {actual})")]
    TooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("{field} is not valid: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn too_short(field: impl Into<String>, min: usize, actual: usize) -> Self {
        ValidationError::TooShort {
            field: field.into(),
            min,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Machine-readable classification carried on every [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input validation
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Missing entities
    UserNotFound,
    RecordNotFound,

    // Conflicts
    DuplicateEmail,

    // Authentication and access
    InvalidCredentials,
    Unauthorized,
    Forbidden,

    // Infrastructure
    ConnectionError,
    SerializationError,
    DatabaseError,
    CacheError,
    QueueError,
    InternalError,
}

impl ErrorCode {
    /// Stable identifier used in log lines and error payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::RecordNotFound => "RECORD_NOT_FOUND",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ConnectionError => "CONNECTION_ERROR",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::QueueError => "QUEUE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type application handlers return.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attaches a key/value pair for callers that need more than the message.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::TooShort { .. } => ErrorCode::ValidationFailed,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}
