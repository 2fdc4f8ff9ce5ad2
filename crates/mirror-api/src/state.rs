//! Application state

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use mirror_core::{BlockList, CacheStrategy, ObjectCache, PurgeLimiter, SourceRegistry, StatsSink};
use mirror_proxy::ForwardClient;

/// Application state shared across handlers
///
/// Everything in here is an immutable snapshot or internally
/// synchronized; handlers never coordinate through anything else.
#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<SourceRegistry>,
    pub blocklist: Arc<BlockList>,
    pub strategy: Arc<CacheStrategy>,
    pub purge: Arc<PurgeLimiter>,
    pub purge_enabled: bool,
    /// Response cache; `None` when caching is disabled
    pub cache: Option<Arc<dyn ObjectCache>>,
    pub stats: Arc<dyn StatsSink>,
    pub client: Arc<ForwardClient>,
    /// Source host implied by path-proxy requests
    pub proxy_source: String,
}

/// Handle for rendering Prometheus metrics
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}
