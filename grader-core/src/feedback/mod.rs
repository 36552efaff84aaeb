//! Feedback generation through a chat completion model
//!
//! [`FeedbackGenerator`] is the seam between the review pipeline and the
//! model provider. Failures are classified into transient ones, which the
//! [`RetryingGenerator`] decorator retries with backoff, and permanent ones,
//! which are surfaced on first occurrence.

use async_trait::async_trait;
use thiserror::Error;

mod openai;
mod retry;

pub use openai::OpenAiGenerator;
pub use retry::{with_retry, RetryPolicy, RetryingGenerator};

/// Trait for text completion backends
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    /// Complete `prompt` with `model`, returning the generated text
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError>;
}

/// Classified failure of a completion request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unexpected status {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Classify an unsuccessful HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => CompletionError::BadRequest(message),
            401 => CompletionError::Authentication(message),
            403 => CompletionError::PermissionDenied(message),
            404 => CompletionError::NotFound(message),
            408 => CompletionError::Timeout(message),
            422 => CompletionError::UnprocessableEntity(message),
            429 => CompletionError::RateLimited(message),
            500..=599 => CompletionError::Server { status, message },
            _ => CompletionError::Unexpected { status, message },
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited(_)
                | CompletionError::Server { .. }
                | CompletionError::Timeout(_)
                | CompletionError::Connection(_)
        )
    }

    /// HTTP-style status reported to callers once this error is final
    pub fn status_code(&self) -> u16 {
        match self {
            CompletionError::BadRequest(_) => 400,
            CompletionError::Authentication(_) => 401,
            CompletionError::PermissionDenied(_) => 403,
            CompletionError::NotFound(_) => 404,
            CompletionError::UnprocessableEntity(_) => 422,
            CompletionError::RateLimited(_)
            | CompletionError::Server { .. }
            | CompletionError::Timeout(_)
            | CompletionError::Connection(_) => 503,
            CompletionError::Unexpected { .. } | CompletionError::MalformedResponse(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_statuses() {
        for (status, expected) in [(400, 400), (401, 401), (403, 403), (404, 404), (422, 422)] {
            let err = CompletionError::from_status(status, "nope");
            assert!(!err.is_transient(), "{} should not be retried", status);
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn test_transient_statuses() {
        for status in [408, 429, 500, 502, 503, 504] {
            let err = CompletionError::from_status(status, "later");
            assert!(err.is_transient(), "{} should be retried", status);
            assert_eq!(err.status_code(), 503);
        }
    }

    #[test]
    fn test_unexpected_status() {
        let err = CompletionError::from_status(418, "teapot");
        assert!(!err.is_transient());
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "unexpected status 418: teapot");
    }

    #[test]
    fn test_transport_failures_are_transient() {
        assert!(CompletionError::Connection("reset".into()).is_transient());
        assert!(CompletionError::Timeout("slow".into()).is_transient());
        assert!(!CompletionError::MalformedResponse("no choices".into()).is_transient());
    }
}
