//! Mirror mode: the target URL is supplied explicitly as a parameter

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use axum::routing::any;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::forward::forward_upstream;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub(crate) struct MirrorQuery {
    url: Option<String>,
}

/// ANY /mirror?url=<encoded target>
pub(crate) async fn mirror(
    State(state): State<AppState>,
    Query(query): Query<MirrorQuery>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let target = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing url parameter".to_string()))?;

    let parsed = Url::parse(&target)
        .map_err(|_| ApiError::BadRequest("invalid url format".to_string()))?;
    let host = parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("url has no host".to_string()))?;

    if !state.sources.is_allowed(&host) {
        warn!(url = %target, host = %host, "rejected mirror request: source not allow-listed");
        return Err(ApiError::Forbidden("source is not supported".to_string()));
    }

    if state.blocklist.is_blocked_url(&target) {
        warn!(url = %target, "rejected mirror request: url is blocked");
        return Err(ApiError::Forbidden("url is blocked".to_string()));
    }

    forward_upstream(&state, method, parsed, &host, headers, body, "mirror").await
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/mirror", any(mirror))
}
