//! Shared error type for quire

use thiserror::Error;

/// Errors raised below the HTTP layer (storage, hashing, startup)
#[derive(Debug, Error)]
pub enum QuireError {
    #[error("Database error: {0}")]
    Database(String),

    /// Unique index violation (username/email already taken)
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, QuireError>;
