//! Purge rate limiting
//!
//! Guards cache-invalidation requests with a per-URL cooldown and a
//! process-wide quota. The per-URL timestamp write is the commit point:
//! two concurrent purges of the same URL can both pass the cooldown
//! check before either commits. That narrow race is accepted rather
//! than serializing unrelated URLs behind one global lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Purge subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Feature flag for the purge endpoint
    #[serde(default)]
    pub enabled: bool,
    /// Cooldown between accepted purges of the same URL
    #[serde(default = "default_rate_limit_minutes")]
    pub rate_limit_minutes: u64,
    /// Total accepted purges allowed since process start
    #[serde(default = "default_max_purge_count")]
    pub max_purge_count: u64,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_limit_minutes: default_rate_limit_minutes(),
            max_purge_count: default_max_purge_count(),
        }
    }
}

fn default_rate_limit_minutes() -> u64 {
    30
}

fn default_max_purge_count() -> u64 {
    1000
}

/// Outcome of a purge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Accepted,
    /// The URL was purged within the cooldown window
    RateLimited,
    /// The process-wide purge quota is exhausted
    QuotaExceeded,
}

/// Per-URL cooldown plus global quota for purge requests
///
/// The per-URL record map only ever grows; the global quota bounds the
/// number of entries it can accumulate over the process lifetime.
pub struct PurgeLimiter {
    window: Duration,
    max_count: u64,
    records: RwLock<HashMap<String, Instant>>,
    count: Mutex<u64>,
}

impl PurgeLimiter {
    pub fn new(config: &PurgeConfig) -> Self {
        Self {
            window: Duration::from_secs(config.rate_limit_minutes * 60),
            max_count: config.max_purge_count,
            records: RwLock::new(HashMap::new()),
            count: Mutex::new(0),
        }
    }

    /// Attempt a purge for an already-validated URL
    pub fn try_purge(&self, url: &str) -> PurgeOutcome {
        self.try_purge_at(url, Instant::now())
    }

    fn try_purge_at(&self, url: &str, now: Instant) -> PurgeOutcome {
        if let Some(last) = self.records.read().get(url).copied()
            && now.duration_since(last) < self.window
        {
            debug!(url, "purge within cooldown window");
            return PurgeOutcome::RateLimited;
        }

        {
            let mut count = self.count.lock();
            if *count >= self.max_count {
                debug!(url, "purge quota exhausted");
                return PurgeOutcome::QuotaExceeded;
            }
            *count += 1;
        }

        self.records.write().insert(url.to_string(), now);
        PurgeOutcome::Accepted
    }

    /// Cooldown between accepted purges of the same URL
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Total purges accepted since process start
    pub fn accepted_count(&self) -> u64 {
        *self.count.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_count: u64) -> PurgeLimiter {
        PurgeLimiter::new(&PurgeConfig {
            enabled: true,
            rate_limit_minutes: 30,
            max_purge_count: max_count,
        })
    }

    #[test]
    fn cooldown_blocks_repeat_purges_until_window_elapses() {
        let limiter = limiter(100);
        let url = "https://cdn.jsdelivr.net/npm/react@18/index.js";
        let start = Instant::now();

        assert_eq!(limiter.try_purge_at(url, start), PurgeOutcome::Accepted);
        assert_eq!(
            limiter.try_purge_at(url, start + Duration::from_secs(10 * 60)),
            PurgeOutcome::RateLimited
        );
        // Exactly at the window boundary the cooldown has elapsed
        assert_eq!(
            limiter.try_purge_at(url, start + Duration::from_secs(30 * 60)),
            PurgeOutcome::Accepted
        );
    }

    #[test]
    fn distinct_urls_are_independent() {
        let limiter = limiter(100);
        let now = Instant::now();
        assert_eq!(limiter.try_purge_at("https://a.example/x", now), PurgeOutcome::Accepted);
        assert_eq!(limiter.try_purge_at("https://a.example/y", now), PurgeOutcome::Accepted);
    }

    #[test]
    fn quota_applies_across_all_urls() {
        let limiter = limiter(2);
        let now = Instant::now();
        assert_eq!(limiter.try_purge_at("https://a.example/1", now), PurgeOutcome::Accepted);
        assert_eq!(limiter.try_purge_at("https://a.example/2", now), PurgeOutcome::Accepted);
        // A brand-new URL is still rejected once the quota is spent
        assert_eq!(
            limiter.try_purge_at("https://a.example/3", now),
            PurgeOutcome::QuotaExceeded
        );
        assert_eq!(limiter.accepted_count(), 2);
    }

    #[test]
    fn rate_limited_purges_do_not_consume_quota() {
        let limiter = limiter(2);
        let now = Instant::now();
        assert_eq!(limiter.try_purge_at("https://a.example/1", now), PurgeOutcome::Accepted);
        assert_eq!(limiter.try_purge_at("https://a.example/1", now), PurgeOutcome::RateLimited);
        assert_eq!(limiter.try_purge_at("https://a.example/2", now), PurgeOutcome::Accepted);
        assert_eq!(limiter.accepted_count(), 2);
    }
}
