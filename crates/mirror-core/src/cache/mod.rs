//! Pluggable response cache
//!
//! The forwarding and purge flows only depend on the [`ObjectCache`]
//! trait; the backend is selected at startup by configuration. The
//! in-memory backend here is the reference implementation.

mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::CoreError;

pub use memory::MemoryCache;

/// How often the background sweep removes expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Cache backend operations
#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// Look up a key. Logically expired entries are never returned,
    /// even when they have not been physically evicted yet.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CoreError>;

    /// Store a value with a time-to-live
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CoreError>;

    /// Remove a key, returning whether it was present
    async fn delete(&self, key: &str) -> Result<bool, CoreError>;

    /// Check for a live (unexpired) entry
    async fn exists(&self, key: &str) -> Result<bool, CoreError>;
}

/// Cache key for a forwarded request
pub fn cache_key(method: &str, url: &str) -> String {
    format!("{method}:{url}")
}

/// Spawn the periodic sweep that evicts expired entries, bounding memory
/// growth between sweeps
pub fn spawn_sweep_task(cache: Arc<MemoryCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep_expired();
            if removed > 0 {
                debug!(removed, "swept expired cache entries");
            }
        }
    })
}
