//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Raw content download error
    #[error("Download error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client construction error
    #[error("GitHub client error: {0}")]
    Client(String),

    /// File entry without a raw download location
    #[error("No download URL for {0}")]
    MissingDownloadUrl(String),
}
