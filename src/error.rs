//! Error types for taskdeck.

use thiserror::Error;

/// Common error type for taskdeck.
#[derive(Error, Debug)]
pub enum TaskdeckError {
    /// Database error.
    ///
    /// Wraps errors from the persistence layer. Database errors from sqlx
    /// are automatically converted. This is the only transient kind; callers
    /// may retry the whole request.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An account with the given email already exists.
    #[error("email address already registered")]
    DuplicateEmail,

    /// Login failed. Wrong email and wrong password are intentionally
    /// indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but not permitted for the operation.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for TaskdeckError {
    fn from(e: sqlx::Error) -> Self {
        TaskdeckError::Database(e.to_string())
    }
}

/// Result type alias for taskdeck operations.
pub type Result<T> = std::result::Result<T, TaskdeckError>;
