//! Redis cache layer for Grader
//!
//! Provides the production [`CacheStore`]: review feedback stored as plain
//! strings under `review:<fingerprint>` keys with a Redis-side expiry.

pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use grader_core::CacheStore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

pub use error::{Error, Result};

/// Redis-backed review cache
///
/// The connection manager reconnects on its own after connection loss, so a
/// single instance can be shared by every request.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to the Redis server at `url` (`redis://host:port/db`)
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to Redis cache");
        Ok(Self { manager })
    }

    /// Round a TTL to whole seconds, never below one
    fn expiry_secs(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> grader_core::Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await.map_err(Error::from)?;
        debug!(key = %key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> grader_core::Result<()> {
        let mut conn = self.manager.clone();
        let seconds = Self::expiry_secs(ttl);
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(Error::from)?;
        debug!(key = %key, len = value.len(), ttl_secs = seconds, "Redis SET EX");
        Ok(())
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}
