//! Statistics snapshot endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;
use mirror_core::format_bytes;

/// GET /api/stats
pub(crate) async fn get_stats(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.stats.snapshot();

    Json(json!({
        "requests": snapshot.total_requests,
        "bandwidth": format_bytes(snapshot.total_bytes),
        "top_sources": snapshot.top_sources,
        "today_requests": snapshot.today_requests,
        "today_traffic": format_bytes(snapshot.today_bytes),
    }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(get_stats))
}
