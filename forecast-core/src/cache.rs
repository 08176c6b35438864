//! Postcode-keyed forecast cache.
//!
//! Entries expire a fixed time after they were written; reads never extend
//! an entry's life. When the entry bound is reached the least-recently-used
//! entry is evicted and the new one is always admitted.

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::time::Duration;

use crate::model::CachedForecastResult;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Shared handle to the forecast cache. Clones refer to the same storage.
#[derive(Debug, Clone)]
pub struct ForecastCache {
    entries: Cache<String, CachedForecastResult>,
}

impl ForecastCache {
    pub fn new(settings: CacheSettings) -> Self {
        let entries = Cache::builder()
            .max_capacity(settings.max_entries)
            .time_to_live(settings.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { entries }
    }

    /// Live entry for `postcode`, if any.
    pub async fn get(&self, postcode: &str) -> Option<CachedForecastResult> {
        self.entries.get(postcode).await
    }

    /// Insert or overwrite, restarting the entry's time-to-live.
    pub async fn put(&self, postcode: &str, value: CachedForecastResult) {
        self.entries.insert(postcode.to_string(), value).await;
    }

    /// Approximate number of entries. Exact after [`Self::run_pending_tasks`].
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply deferred expiration and eviction bookkeeping now.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::forecast;

    fn cached(name: &str) -> CachedForecastResult {
        CachedForecastResult::new(name.to_string(), forecast(&["Tonight"]), true)
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = ForecastCache::default();

        assert!(cache.get("62704").await.is_none());

        cache.put("62704", cached("Springfield")).await;
        let hit = cache.get("62704").await.expect("entry must be present");

        assert_eq!(hit.location_name, "Springfield");
        assert!(hit.is_from_cache);
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let cache = ForecastCache::default();

        cache.put("62704", cached("First")).await;
        cache.put("62704", cached("Second")).await;
        cache.run_pending_tasks().await;

        assert_eq!(cache.get("62704").await.unwrap().location_name, "Second");
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = ForecastCache::new(CacheSettings {
            ttl: Duration::from_millis(300),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        });

        cache.put("62704", cached("Springfield")).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.get("62704").await.is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(cache.get("62704").await.is_none());
    }

    #[tokio::test]
    async fn reads_do_not_extend_lifetime() {
        let cache = ForecastCache::new(CacheSettings {
            ttl: Duration::from_millis(500),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        });

        cache.put("62704", cached("Springfield")).await;
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(cache.get("62704").await.is_some());
        }

        // 300ms elapsed and the entry was read repeatedly; it still dies at 500ms.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(cache.get("62704").await.is_none());
    }

    #[tokio::test]
    async fn overflow_evicts_least_recently_used() {
        let cache = ForecastCache::default();

        for i in 0..DEFAULT_CACHE_MAX_ENTRIES {
            cache.put(&format!("{i:05}"), cached("filler")).await;
            cache.run_pending_tasks().await;
        }
        // Touch the oldest key so the second-oldest becomes the LRU entry.
        assert!(cache.get("00000").await.is_some());
        cache.run_pending_tasks().await;

        cache.put("99999", cached("newcomer")).await;
        cache.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), DEFAULT_CACHE_MAX_ENTRIES);
        assert_eq!(cache.get("99999").await.unwrap().location_name, "newcomer");
        assert!(cache.get("00000").await.is_some());
        assert!(cache.get("00001").await.is_none());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = ForecastCache::default();
        let other = cache.clone();

        cache.put("62704", cached("Springfield")).await;
        assert!(other.get("62704").await.is_some());

        other.clear();
        assert!(cache.get("62704").await.is_none());
    }
}
