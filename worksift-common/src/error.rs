//! Common error types for worksift

use thiserror::Error;

/// Common result type for worksift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the worksift pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization or parse error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required column is absent from an input table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or cell value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal pipeline error
    #[error("Internal error: {0}")]
    Internal(String),
}
