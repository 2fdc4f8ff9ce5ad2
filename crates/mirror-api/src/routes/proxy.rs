//! Path-proxy mode: the target is the configured source host plus the
//! inbound path. Registered as the router fallback so every path that no
//! explicit route claims is treated as mirrored content.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use tracing::warn;
use url::Url;

use super::forward::forward_upstream;
use crate::error::ApiError;
use crate::state::AppState;

/// ANY /<path> against the configured source host
pub(crate) async fn path_proxy(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let path = uri.path().to_string();
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let source = state.proxy_source.clone();
    if !state.sources.is_allowed(&source) {
        warn!(source = %source, "rejected path-proxy request: source not allow-listed");
        return Err(ApiError::Forbidden("source is not supported".to_string()));
    }

    let target = format!("https://{source}{path_and_query}");
    let parsed = Url::parse(&target)
        .map_err(|e| ApiError::Internal(format!("failed to construct upstream url: {e}")))?;

    if state.blocklist.is_blocked_url(&target) {
        warn!(url = %target, "rejected path-proxy request: url is blocked");
        return Err(ApiError::Forbidden("url is blocked".to_string()));
    }

    if state.blocklist.is_blocked_path(&path) {
        warn!(path = %path, "rejected path-proxy request: path is blocked");
        return Err(ApiError::Forbidden("path is blocked".to_string()));
    }

    forward_upstream(&state, method, parsed, &source, headers, body, "path").await
}
