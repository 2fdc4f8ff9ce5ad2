//! Statistics sink boundary
//!
//! The forwarding path reports every transfer here, fire-and-forget.
//! Implementations must never block or fail the request path; anything
//! durable (SQLite, Redis) lives behind this trait outside the core.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Point-in-time view of the collected statistics
#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub total_bytes: u64,
    pub today_requests: u64,
    pub today_bytes: u64,
    /// Source hosts ordered by request count, most active first
    pub top_sources: Vec<String>,
}

/// Collector for per-request transfer events
pub trait StatsSink: Send + Sync {
    /// Record one forwarded request. Must not block.
    fn record_request(&self, url: &str, source: &str, bytes: u64, duration: Duration);

    fn snapshot(&self) -> StatsSnapshot;
}

/// Sink used when statistics are disabled
#[derive(Debug, Default)]
pub struct NoopStats;

impl StatsSink for NoopStats {
    fn record_request(&self, _url: &str, _source: &str, _bytes: u64, _duration: Duration) {}

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::default()
    }
}

#[derive(Default)]
struct StatsInner {
    total_requests: u64,
    total_bytes: u64,
    day: Option<NaiveDate>,
    day_requests: u64,
    day_bytes: u64,
    per_source: HashMap<String, u64>,
}

/// In-memory statistics collector
///
/// Counters live under a single mutex; the critical section is a handful
/// of integer updates, short enough to never stall the request path.
#[derive(Default)]
pub struct MemoryStats {
    inner: Mutex<StatsInner>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsSink for MemoryStats {
    fn record_request(&self, url: &str, source: &str, bytes: u64, duration: Duration) {
        debug!(url, source, bytes, duration_ms = duration.as_millis() as u64, "recording transfer");

        let today = Utc::now().date_naive();
        let mut inner = self.inner.lock();
        if inner.day != Some(today) {
            inner.day = Some(today);
            inner.day_requests = 0;
            inner.day_bytes = 0;
        }
        inner.total_requests += 1;
        inner.total_bytes += bytes;
        inner.day_requests += 1;
        inner.day_bytes += bytes;
        *inner.per_source.entry(source.to_string()).or_default() += 1;
    }

    fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        let mut sources: Vec<_> = inner.per_source.iter().collect();
        sources.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let today = Utc::now().date_naive();
        let (today_requests, today_bytes) = if inner.day == Some(today) {
            (inner.day_requests, inner.day_bytes)
        } else {
            (0, 0)
        };

        StatsSnapshot {
            total_requests: inner.total_requests,
            total_bytes: inner.total_bytes,
            today_requests,
            today_bytes,
            top_sources: sources.into_iter().take(5).map(|(s, _)| s.clone()).collect(),
        }
    }
}

/// Human-readable byte count, e.g. "1.5 MB"
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let units = ["K", "M", "G", "T", "P", "E"];
    format!("{:.1} {}B", bytes as f64 / div as f64, units[exp])
}
