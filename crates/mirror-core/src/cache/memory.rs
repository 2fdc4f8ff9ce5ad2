//! In-memory cache backend

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::ObjectCache;
use crate::error::CoreError;

struct CacheSlot {
    value: Bytes,
    expires_at: Instant,
}

/// Reference in-memory cache
///
/// Reads take a shared lock, all mutations take the exclusive lock.
/// When an insertion would exceed `max_entries`, the entry with the
/// earliest expiration time is evicted first — not the least recently
/// used one; expiry order is a deliberate simplification.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheSlot>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        info!(max_entries, "initialized in-memory cache");
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Remove all entries whose expiration has passed, returning how many
    /// were dropped. Called by the background sweep task.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, slot| slot.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Evict the entry with the earliest expiration. Caller holds the
    /// write lock.
    fn evict_earliest(entries: &mut HashMap<String, CacheSlot>) {
        let earliest = entries
            .iter()
            .min_by_key(|(_, slot)| slot.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = earliest {
            debug!(key = %key, "evicting earliest-expiring cache entry");
            entries.remove(&key);
        }
    }
}

#[async_trait]
impl ObjectCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CoreError> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|slot| slot.expires_at > Instant::now())
            .map(|slot| slot.value.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CoreError> {
        let mut entries = self.entries.write();
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            Self::evict_earliest(&mut entries);
        }
        entries.insert(
            key.to_string(),
            CacheSlot {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, CoreError> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .is_some_and(|slot| slot.expires_at > Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_live_entries() {
        let cache = MemoryCache::new(16);
        cache
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));
        assert!(cache.exists("k").await.unwrap());
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let cache = MemoryCache::new(16);
        cache
            .set("k", Bytes::from_static(b"v"), Duration::from_millis(10))
            .await
            .unwrap();
        // Still live shortly after insertion
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
        // Not yet physically evicted, only logically expired
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn sweep_removes_expired_entries() {
        let cache = MemoryCache::new(16);
        cache
            .set("stale", Bytes::from_static(b"a"), Duration::from_millis(5))
            .await
            .unwrap();
        cache
            .set("fresh", Bytes::from_static(b"b"), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn capacity_overflow_evicts_earliest_expiry() {
        let cache = MemoryCache::new(2);
        cache
            .set("late", Bytes::from_static(b"a"), Duration::from_secs(100))
            .await
            .unwrap();
        cache
            .set("early", Bytes::from_static(b"b"), Duration::from_secs(50))
            .await
            .unwrap();
        cache
            .set("new", Bytes::from_static(b"c"), Duration::from_secs(75))
            .await
            .unwrap();

        // "early" had the soonest expiration and must be the one evicted
        assert!(!cache.exists("early").await.unwrap());
        assert!(cache.exists("late").await.unwrap());
        assert!(cache.exists("new").await.unwrap());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn overwriting_does_not_evict() {
        let cache = MemoryCache::new(2);
        cache
            .set("a", Bytes::from_static(b"1"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("b", Bytes::from_static(b"2"), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("a", Bytes::from_static(b"3"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").await.unwrap(), Some(Bytes::from_static(b"3")));
        assert!(cache.exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let cache = MemoryCache::new(16);
        cache
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
