//! CLI command implementations

pub mod review;
pub mod serve;
pub mod tree;

pub use review::ReviewArgs;
pub use serve::ServeArgs;
pub use tree::TreeArgs;

use std::sync::Arc;

use anyhow::Context;
use grader_cache::RedisCache;
use grader_core::{
    CacheStore, Config, MemoryCache, OpenAiGenerator, RetryPolicy, RetryingGenerator,
    ReviewService, ReviewServiceConfig, Secrets,
};
use grader_github::{FileFilter, GitHubClient, RepositoryWalker};

/// Build the repository walker from configuration and secrets
pub fn build_walker(config: &Config, secrets: &Secrets) -> anyhow::Result<RepositoryWalker<GitHubClient>> {
    let token = secrets.github_token();
    if token.is_none() {
        tracing::warn!("No GitHub token configured, using unauthenticated API access");
    }
    let client = GitHubClient::new(&config.github, token)?;
    Ok(RepositoryWalker::new(client, FileFilter::from_config(&config.review)))
}

/// Wire the production review service
///
/// With `memory_cache` set the Redis server is not contacted and reviews are
/// cached in-process for the lifetime of the command.
pub async fn build_service(
    config: &Config,
    secrets: &Secrets,
    memory_cache: bool,
) -> anyhow::Result<ReviewService> {
    let api_key = secrets.openai_api_key().context(
        "OpenAI API key not found. Set OPENAI_API_KEY environment variable \
         or add it to ~/.config/grader/secrets.toml",
    )?;

    let cache: Arc<dyn CacheStore> = if memory_cache {
        tracing::info!("Using in-memory review cache");
        Arc::new(MemoryCache::new())
    } else {
        let redis = RedisCache::connect(&config.cache.redis_url)
            .await
            .with_context(|| format!("Failed to connect to Redis at {}", config.cache.redis_url))?;
        Arc::new(redis)
    };

    let walker = build_walker(config, secrets)?;
    let generator = RetryingGenerator::new(
        OpenAiGenerator::new(&config.llm, api_key)?,
        RetryPolicy::from(&config.llm.retry),
    );

    Ok(ReviewService::new(
        cache,
        Arc::new(walker),
        Arc::new(generator),
        ReviewServiceConfig::from_config(config),
    ))
}
