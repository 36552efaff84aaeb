//! Grader Core - Core library for Grader assignment reviews
//!
//! This crate provides the review pipeline: request validation, cache-key
//! derivation, prompt construction, resilient feedback generation, and the
//! orchestrator that ties them to a cache and a repository fetcher.

pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod review;
pub mod secrets;
pub mod source;

pub use cache::{CacheStore, MemoryCache};
pub use config::Config;
pub use error::{Error, Result};
pub use feedback::{CompletionError, FeedbackGenerator, OpenAiGenerator, RetryPolicy, RetryingGenerator};
pub use review::{
    CandidateLevel, CompletedReview, RepositoryRef, ReviewError, ReviewPayload, ReviewRequest,
    ReviewService, ReviewServiceConfig, ValidationError,
};
pub use secrets::Secrets;
pub use source::{RepositorySnapshot, SourceTreeFetcher};
