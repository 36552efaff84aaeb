//! Review cache abstraction
//!
//! The pipeline only needs GET and SET-with-expiry. Production deployments
//! use the Redis store from `grader-cache`; [`MemoryCache`] keeps the same
//! semantics in-process for tests and local runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::Result;

/// Key/value store with per-key expiration
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the value stored under `key`
    ///
    /// `Ok(None)` means the key is absent; a stored empty string is returned
    /// as `Ok(Some(""))`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value, for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// In-process cache; expired entries are dropped on read and on every write
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()))
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };

        let mut entries = self.entries.lock().await;
        entries.retain(|_, existing| existing.expires_at > now);
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("review:missing").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_value_is_present() {
        let cache = MemoryCache::new();
        cache.set("review:empty", "", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("review:empty").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        cache.set("review:k", "first", Duration::from_secs(60)).await.unwrap();
        cache.set("review:k", "second", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("review:k").await.unwrap(), Some("second".to_string()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("review:k", "feedback", Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(cache.get("review:k").await.unwrap(), Some("feedback".to_string()));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(cache.get("review:k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_prunes_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("review:a", "first", Duration::from_secs(1)).await.unwrap();
        cache.set("review:b", "second", Duration::from_secs(1)).await.unwrap();
        cache.set("review:c", "third", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.set("review:d", "fourth", Duration::from_secs(60)).await.unwrap();

        let entries = cache.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert!(entries.contains_key("review:c"));
        assert!(entries.contains_key("review:d"));
    }
}
