//! Mapping of request failures to `{"detail": ...}` responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use grader_core::{ReviewError, ValidationError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub detail: String,
}

/// Failure of a request at the HTTP boundary
#[derive(Debug)]
pub enum ApiError {
    /// Body is not syntactically valid JSON
    MalformedBody(String),
    /// Body is JSON but misses fields or fails validation
    Invalid(String),
    /// The review pipeline failed upstream
    Review(ReviewError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Review(err) => {
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::MalformedBody(detail) | ApiError::Invalid(detail) => detail.clone(),
            ApiError::Review(err) => err.detail().to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) => ApiError::MalformedBody(rejection.body_text()),
            _ => ApiError::Invalid(rejection.body_text()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Invalid(err.to_string())
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        ApiError::Review(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), detail = %self.detail(), "Review request failed");
        }
        (status, Json(ErrorEnvelope { detail: self.detail() })).into_response()
    }
}
