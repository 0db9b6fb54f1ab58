//! Layered response cache.

use super::backend::{CacheStore, MemoryStore};
use super::disk::DiskStore;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Cache counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Two-tier response cache: a mandatory bounded in-memory tier in front
/// of an optional persistent tier.
///
/// The composition is fixed: reads check the fast tier, then the
/// persistent tier, promoting a persistent hit into the fast tier.
/// Writes go to both. Tier failures degrade to misses; a cache problem
/// never fails the request that consulted it.
pub struct ResponseCache {
    memory: MemoryStore,
    disk: Option<DiskStore>,
    default_ttl: Duration,
    enabled: bool,
    stats: AtomicStats,
}

impl ResponseCache {
    pub fn new(capacity: usize, default_ttl: Duration, enabled: bool) -> Self {
        Self {
            memory: MemoryStore::new(capacity),
            disk: None,
            default_ttl,
            enabled,
            stats: AtomicStats::default(),
        }
    }

    /// Attach the persistent tier.
    pub fn with_disk(mut self, disk: DiskStore) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }

        if let Some(bytes) = self.tier_get(&self.memory, key).await {
            return self.decode(key, &bytes);
        }

        if let Some(disk) = &self.disk {
            if let Some(bytes) = self.tier_get(disk, key).await {
                // Promote so the next read stays off the disk.
                let _ = self.memory.set(key, &bytes, self.default_ttl).await;
                debug!(key, "promoted cache entry from persistent tier");
                return self.decode(key, &bytes);
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn put_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %e, "failed to encode cache value");
                return;
            }
        };

        if self.memory.set(key, &bytes, ttl).await.is_ok() {
            self.stats.sets.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.set(key, &bytes, ttl).await {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %e, "failed to write persistent cache record");
            }
        }
    }

    pub async fn delete(&self, key: &str) {
        let _ = self.memory.delete(key).await;
        if let Some(disk) = &self.disk {
            let _ = disk.delete(key).await;
        }
    }

    /// Empty the in-memory tier only.
    pub async fn clear_memory(&self) {
        let _ = self.memory.clear().await;
    }

    /// Empty both tiers.
    pub async fn clear_all(&self) {
        let _ = self.memory.clear().await;
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.clear().await {
                warn!(error = %e, "failed to clear persistent cache tier");
            }
        }
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.len().await.unwrap_or(0)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    async fn tier_get<S: CacheStore + ?Sized>(&self, tier: &S, key: &str) -> Option<Vec<u8>> {
        match tier.get(key).await {
            Ok(Some(bytes)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(bytes)
            }
            Ok(None) => None,
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key, tier = tier.name(), error = %e, "cache tier read failed");
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, bytes: &[u8]) -> Option<T> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // A stale or incompatible record is a miss, never an error
                // surfaced to the caller.
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %e, "failed to decode cached value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = ResponseCache::new(8, Duration::from_secs(60), false);
        cache.put("k", &serde_json::json!({"v": 1})).await;
        assert_eq!(cache.get::<serde_json::Value>("k").await, None);
        assert_eq!(cache.stats().sets, 0);
    }

    #[tokio::test]
    async fn memory_round_trip_and_stats() {
        let cache = ResponseCache::new(8, Duration::from_secs(60), true);
        let value = serde_json::json!({"v": 1});
        cache.put("k", &value).await;

        assert_eq!(cache.get::<serde_json::Value>("k").await, Some(value));
        assert_eq!(cache.get::<serde_json::Value>("missing").await, None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn persistent_hit_promotes_into_memory() {
        let dir = tempdir().unwrap();
        let value = serde_json::json!({"v": "persisted"});

        {
            let cache = ResponseCache::new(8, Duration::from_secs(60), true)
                .with_disk(DiskStore::new(dir.path()).unwrap());
            cache.put("k", &value).await;
        }

        // Fresh cache: empty memory tier, same disk directory.
        let cache = ResponseCache::new(8, Duration::from_secs(60), true)
            .with_disk(DiskStore::new(dir.path()).unwrap());
        assert_eq!(cache.memory_len().await, 0);
        assert_eq!(cache.get::<serde_json::Value>("k").await, Some(value.clone()));
        // Promoted: second read is served by the memory tier.
        assert_eq!(cache.memory_len().await, 1);
        assert_eq!(cache.get::<serde_json::Value>("k").await, Some(value));
    }

    #[tokio::test]
    async fn clear_memory_leaves_persistent_tier() {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(8, Duration::from_secs(60), true)
            .with_disk(DiskStore::new(dir.path()).unwrap());
        let value = serde_json::json!({"v": 1});
        cache.put("k", &value).await;

        cache.clear_memory().await;
        assert_eq!(cache.memory_len().await, 0);
        // Still served from disk.
        assert_eq!(cache.get::<serde_json::Value>("k").await, Some(value));

        cache.clear_all().await;
        assert_eq!(cache.get::<serde_json::Value>("k").await, None);
    }
}
