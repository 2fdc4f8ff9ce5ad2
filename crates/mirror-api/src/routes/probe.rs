//! Latency probing for diagnostic comparison

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub(crate) struct LatencyRequest {
    url: String,
    /// Optional mirrored form of the same URL to probe for comparison
    #[serde(default)]
    mirror_url: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct LatencyResponse {
    url: String,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mirror_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mirror_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    improvement: Option<String>,
}

/// POST /api/test-latency
pub(crate) async fn test_latency(
    State(state): State<AppState>,
    Json(request): Json<LatencyRequest>,
) -> Result<Json<LatencyResponse>, ApiError> {
    Url::parse(&request.url)
        .map_err(|_| ApiError::BadRequest("invalid url format".to_string()))?;

    let latency_ms = state.client.probe_latency(&request.url).await?;

    let mut response = LatencyResponse {
        url: request.url,
        latency_ms,
        mirror_url: None,
        mirror_latency_ms: None,
        improvement: None,
    };

    if let Some(mirror_url) = request.mirror_url {
        Url::parse(&mirror_url)
            .map_err(|_| ApiError::BadRequest("invalid mirror url format".to_string()))?;

        let mirror_latency_ms = state.client.probe_latency(&mirror_url).await?;
        let improvement = if latency_ms > 0 {
            (latency_ms as f64 - mirror_latency_ms as f64) / latency_ms as f64 * 100.0
        } else {
            0.0
        };

        response.mirror_url = Some(mirror_url);
        response.mirror_latency_ms = Some(mirror_latency_ms);
        response.improvement = Some(format!("{improvement:.1}%"));
    }

    Ok(Json(response))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/api/test-latency", post(test_latency))
}
