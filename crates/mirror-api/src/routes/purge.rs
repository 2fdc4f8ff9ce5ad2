//! Cache purge endpoint, gated by a feature flag and the purge limiter

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;
use mirror_core::{PurgeOutcome, cache_key};

/// GET /purge/{url} with a URL-encoded target
pub(crate) async fn purge(
    State(state): State<AppState>,
    Path(url): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.purge_enabled {
        return Err(ApiError::Forbidden("purge is not enabled".to_string()));
    }

    if url.is_empty() {
        return Err(ApiError::BadRequest("missing url parameter".to_string()));
    }

    // Validate before the limiter runs; malformed targets never touch
    // purge state.
    Url::parse(&url).map_err(|_| ApiError::BadRequest("invalid url format".to_string()))?;

    match state.purge.try_purge(&url) {
        PurgeOutcome::Accepted => {
            metrics::counter!("static_mirror_purges_total", "outcome" => "accepted").increment(1);

            if let Some(cache) = &state.cache
                && let Err(err) = cache.delete(&cache_key("GET", &url)).await
            {
                warn!(url = %url, error = %err, "cache invalidation failed");
            }

            info!(url = %url, "purge accepted");
            Ok(Json(json!({
                "success": true,
                "message": "purge request processed",
                "url": url,
                "time": Utc::now().to_rfc3339(),
            })))
        }
        PurgeOutcome::RateLimited => {
            metrics::counter!("static_mirror_purges_total", "outcome" => "rate_limited").increment(1);
            Err(ApiError::PurgeRateLimited {
                window_minutes: state.purge.window().as_secs() / 60,
            })
        }
        PurgeOutcome::QuotaExceeded => {
            metrics::counter!("static_mirror_purges_total", "outcome" => "quota_exceeded").increment(1);
            Err(ApiError::PurgeQuotaExceeded)
        }
    }
}

/// GET /purge without a target
async fn purge_missing_target() -> ApiError {
    ApiError::BadRequest("missing url parameter".to_string())
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/purge", get(purge_missing_target))
        .route("/purge/{*url}", get(purge))
}
