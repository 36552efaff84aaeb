//! Retry with exponential backoff and jitter

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::{CompletionError, FeedbackGenerator};
use crate::config::RetryConfig;

/// Configuration for retrying failed operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Lower bound of every wait, and the base of the exponential growth
    pub initial_delay: Duration,

    /// Upper bound of every wait
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with the default delays and the given attempt budget
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Upper bound of the wait after failed attempt `attempt` (0-indexed)
    ///
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Randomized wait after failed attempt `attempt` (0-indexed)
    ///
    /// Uniform in `[initial_delay, ceiling(attempt)]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let upper = self.ceiling(attempt);
        let lower = self.initial_delay.min(upper);

        if upper <= lower {
            return upper;
        }

        let secs = rand::thread_rng().gen_range(lower.as_secs_f64()..=upper.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: config.initial_delay,
            max_delay: config.max_delay,
        }
    }
}

/// Execute an async operation, retrying failures that `is_retryable` accepts
///
/// The first attempt always runs. A non-retryable error, or the error of the
/// last allowed attempt, is returned unchanged.
pub async fn with_retry<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;

                if !is_retryable(&error) {
                    debug!(attempt, error = %error, "Attempt failed with a permanent error");
                    return Err(error);
                }

                if attempt >= policy.max_attempts {
                    warn!(attempt, error = %error, "Giving up after exhausting retries");
                    return Err(error);
                }

                let delay = policy.delay_for(attempt - 1);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Decorator retrying transient failures of another generator
#[derive(Debug, Clone)]
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G> RetryingGenerator<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped generator
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: FeedbackGenerator> FeedbackGenerator for RetryingGenerator<G> {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        let inner = &self.inner;
        with_retry(&self.policy, CompletionError::is_transient, move || {
            inner.complete(prompt, model)
        })
        .await
    }
}
