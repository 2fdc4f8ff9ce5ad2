//! Static Mirror Core Business Logic
//!
//! This crate provides the core functionality for the mirror service:
//! the source allow-list, URL/path block rules, the cache-control
//! decision engine, the purge rate limiter and the pluggable cache
//! and statistics backends.

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;
pub mod purge;
pub mod stats;

pub use cache::{MemoryCache, ObjectCache, cache_key, spawn_sweep_task};
pub use config::{BlockList, SourceEntry, SourceRegistry};
pub use error::CoreError;
pub use policy::{CacheStrategy, FileType};
pub use purge::{PurgeConfig, PurgeLimiter, PurgeOutcome};
pub use stats::{MemoryStats, NoopStats, StatsSink, StatsSnapshot, format_bytes};
