//! Review module for candidate assignment reviews
//!
//! This module provides the validated request types, the cache-key
//! fingerprint, the prompt template, and the [`ReviewService`] that runs the
//! pipeline end to end.

pub mod error;
pub mod fingerprint;
pub mod prompt;
pub mod request;
pub mod service;

pub use error::ReviewError;
pub use fingerprint::{cache_key, fingerprint};
pub use prompt::build_prompt;
pub use request::{
    CandidateLevel, CompletedReview, RepositoryRef, ReviewPayload, ReviewRequest, ValidationError,
};
pub use service::{ReviewService, ReviewServiceConfig};
