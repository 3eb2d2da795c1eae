//! Common error types for salesdash

use thiserror::Error;

/// Common result type for salesdash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the salesdash services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named raw source could not be read at all
    #[error("Source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A source was readable but a required column is absent
    #[error("Source '{source_name}' is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Too few distinct entities to compute a meaningful result
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
