//! Store error types.

use thiserror::Error;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row {id}: {message}")]
    Corrupt { id: i64, message: String },

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
