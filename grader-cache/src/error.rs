//! Error types for cache operations

use thiserror::Error;

/// Cache error types
#[derive(Error, Debug)]
pub enum Error {
    /// Redis client or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for grader_core::Error {
    fn from(err: Error) -> Self {
        grader_core::Error::Cache(err.to_string())
    }
}
