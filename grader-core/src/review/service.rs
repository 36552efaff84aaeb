//! Review orchestration
//!
//! [`ReviewService`] takes a validated [`ReviewRequest`] through the whole
//! pipeline: cache lookup, repository fetch, prompt construction, feedback
//! generation, and cache write. Concurrent identical requests are not
//! deduplicated; both may miss the cache and run the pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{build_prompt, cache_key, CompletedReview, ReviewError, ReviewRequest};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::feedback::FeedbackGenerator;
use crate::source::SourceTreeFetcher;

/// Settings the review service needs from the configuration
#[derive(Debug, Clone)]
pub struct ReviewServiceConfig {
    /// Model identifier passed to the generator
    pub model: String,
    /// Lifetime of cached feedback
    pub cache_ttl: Duration,
}

impl ReviewServiceConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            cache_ttl: Duration::from_secs(3600),
        }
    }

    /// Take model and TTL from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            cache_ttl: config.cache.ttl(),
        }
    }

    /// Set the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Runs assignment reviews against a cache, a fetcher and a generator
#[derive(Clone)]
pub struct ReviewService {
    cache: Arc<dyn CacheStore>,
    fetcher: Arc<dyn SourceTreeFetcher>,
    generator: Arc<dyn FeedbackGenerator>,
    config: ReviewServiceConfig,
}

impl ReviewService {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        fetcher: Arc<dyn SourceTreeFetcher>,
        generator: Arc<dyn FeedbackGenerator>,
        config: ReviewServiceConfig,
    ) -> Self {
        Self {
            cache,
            fetcher,
            generator,
            config,
        }
    }

    /// Produce feedback for `request`, from the cache when possible
    ///
    /// Only a present, non-empty cached value counts as a hit. Cache errors
    /// never fail the review: a failed lookup is treated as a miss and a
    /// failed write is logged. Model failures are returned as a
    /// [`ReviewError`] and nothing is cached.
    pub async fn process(&self, request: &ReviewRequest) -> Result<CompletedReview, ReviewError> {
        let key = cache_key(request);

        match self.cache.get(&key).await {
            Ok(Some(cached)) if !cached.is_empty() => {
                info!(key = %key, "Serving review from cache");
                return Ok(CompletedReview::new(cached));
            }
            Ok(Some(_)) => debug!(key = %key, "Cached review is empty, regenerating"),
            Ok(None) => debug!(key = %key, "Review cache miss"),
            Err(err) => warn!(key = %key, error = %err, "Cache lookup failed, continuing without cache"),
        }

        let repository = request.repository();
        let snapshot = self.fetcher.fetch(repository).await;
        info!(
            repository = %repository,
            files = snapshot.paths().len(),
            content_len = snapshot.content().len(),
            "Fetched repository snapshot"
        );
        if snapshot.is_empty() {
            warn!(repository = %repository, "No reviewable files found, reviewing empty content");
        }

        let prompt = build_prompt(request, snapshot.content());

        let feedback = self
            .generator
            .complete(&prompt, &self.config.model)
            .await
            .map_err(|err| {
                warn!(repository = %repository, error = %err, "Feedback generation failed");
                ReviewError::from(err)
            })?;

        if let Err(err) = self.cache.set(&key, &feedback, self.config.cache_ttl).await {
            warn!(key = %key, error = %err, "Failed to cache review feedback");
        } else {
            debug!(key = %key, ttl_secs = self.config.cache_ttl.as_secs(), "Cached review feedback");
        }

        Ok(CompletedReview::new(feedback))
    }
}

impl std::fmt::Debug for ReviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::feedback::{CompletionError, RetryPolicy, RetryingGenerator};
    use crate::review::{CandidateLevel, RepositoryRef};
    use crate::source::RepositorySnapshot;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubFetcher {
        snapshot: RepositorySnapshot,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn with_main_py() -> Self {
            Self {
                snapshot: RepositorySnapshot::new(
                    "# File: main.py\nprint(1)\n\n",
                    vec!["main.py".to_string()],
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceTreeFetcher for StubFetcher {
        async fn fetch(&self, _repository: &RepositoryRef) -> RepositorySnapshot {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.snapshot.clone()
        }
    }

    /// Replays scripted outcomes, then keeps answering with `reply`
    struct StubGenerator {
        script: Mutex<VecDeque<std::result::Result<String, CompletionError>>>,
        reply: String,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl StubGenerator {
        fn replying(reply: &str) -> Self {
            Self::scripted(reply, Vec::new())
        }

        fn scripted(reply: &str, script: Vec<std::result::Result<String, CompletionError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_call(&self) -> Option<(String, String)> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl FeedbackGenerator for StubGenerator {
        async fn complete(
            &self,
            prompt: &str,
            model: &str,
        ) -> std::result::Result<String, CompletionError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.to_string()));
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(self.reply.clone()))
        }
    }

    /// Cache whose reads and/or writes always fail
    struct BrokenCache {
        fail_reads: bool,
        inner: MemoryCache,
    }

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(Error::Cache("connection refused".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(Error::Cache("connection refused".to_string()))
        }
    }

    fn widget_request() -> ReviewRequest {
        ReviewRequest::new(
            "Build a REST API",
            "https://github.com/acme/widget",
            CandidateLevel::Junior,
        )
        .unwrap()
    }

    fn service(
        cache: Arc<dyn CacheStore>,
        fetcher: Arc<StubFetcher>,
        generator: Arc<dyn FeedbackGenerator>,
    ) -> ReviewService {
        ReviewService::new(
            cache,
            fetcher,
            generator,
            ReviewServiceConfig::new("gpt-4o-mini").with_cache_ttl(Duration::from_secs(3600)),
        )
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache.clone(), fetcher.clone(), generator.clone());

        let first = service.process(&widget_request()).await.unwrap();
        assert_eq!(first, CompletedReview::new("Looks fine."));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(generator.calls(), 1);

        let second = service.process(&widget_request()).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_and_model_reach_generator() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache, fetcher, generator.clone());

        service.process(&widget_request()).await.unwrap();

        let (prompt, model) = generator.last_call().unwrap();
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(
            prompt,
            build_prompt(&widget_request(), "# File: main.py\nprint(1)\n\n")
        );
    }

    #[tokio::test]
    async fn test_prepopulated_cache_short_circuits() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set(&cache_key(&widget_request()), "Cached verdict", Duration::from_secs(60))
            .await
            .unwrap();
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Fresh verdict"));
        let service = service(cache, fetcher.clone(), generator.clone());

        let review = service.process(&widget_request()).await.unwrap();
        assert_eq!(review.data, "Cached verdict");
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_cached_value_is_a_miss() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set(&cache_key(&widget_request()), "", Duration::from_secs(60))
            .await
            .unwrap();
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache.clone(), fetcher.clone(), generator.clone());

        let review = service.process(&widget_request()).await.unwrap();
        assert_eq!(review.data, "Looks fine.");
        assert_eq!(generator.calls(), 1);
        assert_eq!(
            cache.get(&cache_key(&widget_request())).await.unwrap(),
            Some("Looks fine.".to_string())
        );
    }

    #[tokio::test]
    async fn test_different_requests_do_not_share_cache() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache, fetcher.clone(), generator.clone());

        let senior = ReviewRequest::new(
            "Build a REST API",
            "https://github.com/acme/widget",
            CandidateLevel::Senior,
        )
        .unwrap();

        service.process(&widget_request()).await.unwrap();
        service.process(&senior).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_surfaced_and_not_cached() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::scripted(
            "unused",
            vec![Err(CompletionError::Authentication("bad key".to_string()))],
        ));
        let service = service(cache.clone(), fetcher, generator.clone());

        let err = service.process(&widget_request()).await.unwrap_err();
        assert_eq!(err.status(), 401);
        assert!(err.detail().contains("Error accessing OpenAI API"));
        assert_eq!(generator.calls(), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_unavailable() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let failures = (0..6)
            .map(|_| Err(CompletionError::Timeout("no answer".to_string())))
            .collect();
        let stub = StubGenerator::scripted("unused", failures);
        let generator = Arc::new(RetryingGenerator::new(stub, RetryPolicy::default()));
        let service = service(cache.clone(), fetcher, generator.clone());

        let err = service.process(&widget_request()).await.unwrap_err();
        assert_eq!(err.status(), 503);
        assert_eq!(generator.inner().calls(), 6);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_recovers_through_retry() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let stub = StubGenerator::scripted(
            "Looks fine.",
            vec![Err(CompletionError::RateLimited("slow down".to_string()))],
        );
        let generator = Arc::new(RetryingGenerator::new(stub, RetryPolicy::default()));
        let service = service(cache, fetcher.clone(), generator.clone());

        let review = service.process(&widget_request()).await.unwrap();
        assert_eq!(review.data, "Looks fine.");
        assert_eq!(generator.inner().calls(), 2);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_through() {
        let cache = Arc::new(BrokenCache {
            fail_reads: true,
            inner: MemoryCache::new(),
        });
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache, fetcher.clone(), generator);

        let review = service.process(&widget_request()).await.unwrap();
        assert_eq!(review.data, "Looks fine.");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_feedback() {
        let cache = Arc::new(BrokenCache {
            fail_reads: false,
            inner: MemoryCache::new(),
        });
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = service(cache, fetcher, generator.clone());

        assert_eq!(service.process(&widget_request()).await.unwrap().data, "Looks fine.");
        // nothing was cached, so the pipeline runs again
        assert_eq!(service.process(&widget_request()).await.unwrap().data, "Looks fine.");
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_reruns_pipeline() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = Arc::new(StubFetcher::with_main_py());
        let generator = Arc::new(StubGenerator::replying("Looks fine."));
        let service = ReviewService::new(
            cache,
            fetcher.clone(),
            generator.clone(),
            ReviewServiceConfig::new("gpt-4o-mini").with_cache_ttl(Duration::from_secs(1)),
        );

        service.process(&widget_request()).await.unwrap();
        service.process(&widget_request()).await.unwrap();
        assert_eq!(generator.calls(), 1);

        tokio::time::advance(Duration::from_millis(1500)).await;

        service.process(&widget_request()).await.unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn test_config_from_loaded_config() {
        let mut config = Config::default();
        config.llm.model = "gpt-4o".to_string();
        config.cache.ttl_secs = 42;

        let service_config = ReviewServiceConfig::from_config(&config);
        assert_eq!(service_config.model, "gpt-4o");
        assert_eq!(service_config.cache_ttl, Duration::from_secs(42));
    }
}
