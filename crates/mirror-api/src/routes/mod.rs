//! API routes

mod forward;
mod health;
pub mod metrics;
mod mirror;
mod probe;
mod process;
mod proxy;
mod purge;
mod stats;

use axum::Router;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// The path-proxy handler is installed as the fallback so every request
/// that misses a named route is treated as a path to forward to the
/// configured default source.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Explicit mirror endpoint
        .merge(mirror::routes())
        // Cache invalidation
        .merge(purge::routes())
        // JSON API surface
        .merge(probe::routes())
        .merge(process::routes())
        .merge(stats::routes())
        // Everything else is forwarded by path
        .fallback(proxy::path_proxy)
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
