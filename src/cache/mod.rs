// Injectable response cache for read-only listings

use crate::config::CacheConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| Instant::now() >= expires_at)
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

/// In-process TTL cache with a soft capacity bound.
///
/// When full, expired entries are swept first; if that frees nothing the
/// entry closest to expiry is evicted.
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    store: Arc<DashMap<String, CacheEntry>>,
    capacity: usize,
}

impl InMemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn make_room(&self) {
        if self.store.len() < self.capacity {
            return;
        }

        self.store.retain(|_, entry| !entry.is_expired());
        if self.store.len() < self.capacity {
            return;
        }

        let victim = self
            .store
            .iter()
            .min_by_key(|entry| {
                let expires_at = entry.value().expires_at;
                (expires_at.is_none(), expires_at)
            })
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            debug!(key = %key, "evicting cache entry");
            self.store.remove(&key);
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let hit = match self.store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if hit {
            self.store.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if !self.store.contains_key(key) {
            self.make_room();
        }
        self.store
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.clear();
        Ok(())
    }
}

/// Backend used when caching is disabled; every lookup misses.
#[derive(Debug, Clone, Default)]
pub struct NoopCache;

#[async_trait::async_trait]
impl CacheBackend for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

pub struct CacheFactory;

impl CacheFactory {
    pub fn create_cache(config: &CacheConfig) -> Arc<dyn CacheBackend> {
        if !config.enabled {
            return Arc::new(NoopCache);
        }
        Arc::new(InMemoryCache::new(config.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = InMemoryCache::new(10);
        cache.set("store:page=1", "[]", None).await.unwrap();
        assert_eq!(cache.get("store:page=1").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = InMemoryCache::new(10);
        cache
            .set("k", "v", Some(Duration::from_millis(0)))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn capacity_is_respected() {
        let cache = InMemoryCache::new(2);
        cache.set("a", "1", Some(Duration::from_secs(10))).await.unwrap();
        cache.set("b", "2", Some(Duration::from_secs(60))).await.unwrap();
        cache.set("c", "3", Some(Duration::from_secs(60))).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("c").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn clear_and_delete_remove_entries() {
        let cache = InMemoryCache::new(10);
        cache.set("a", "1", None).await.unwrap();
        cache.set("b", "2", None).await.unwrap();
        cache.delete("a").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        cache.clear().await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn disabled_config_yields_noop_backend() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = CacheFactory::create_cache(&config);
        cache.set("a", "1", None).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
    }
}
