//! Caller-facing review failures

use thiserror::Error;

use crate::feedback::CompletionError;

/// A failed review, carrying the HTTP-style status the caller should see
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ReviewError {
    status: u16,
    detail: String,
}

impl ReviewError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// HTTP-style status classification
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Human-readable explanation
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<CompletionError> for ReviewError {
    fn from(err: CompletionError) -> Self {
        let detail = match err.status_code() {
            503 => format!("Service temporarily unavailable. Error accessing OpenAI API: {}", err),
            _ => format!("Error accessing OpenAI API: {}", err),
        };
        Self::new(err.status_code(), detail)
    }
}
