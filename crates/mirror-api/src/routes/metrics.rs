//! Prometheus exposition endpoint

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::state::MetricsHandle;

/// GET /metrics in the Prometheus text format
async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> String {
    handle.render()
}

/// Routes carrying their own recorder-handle state, merged into the main
/// router after `with_state`
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}
