//! Error types for Grader

use thiserror::Error;

/// Result type alias for Grader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Grader operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache backend error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
