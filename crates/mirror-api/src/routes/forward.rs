//! Shared forwarding pipeline
//!
//! Both the mirror and path-proxy handlers end up here once their target
//! has been validated: dispatch upstream, copy the response headers,
//! apply the cache-control engine and stream the body through.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use mirror_core::{CacheStrategy, StatsSink};
use mirror_proxy::UpstreamBody;
use tracing::warn;
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;

/// Reports the transfer to the stats sink on drop: after the response
/// body stream finishes or aborts, or straight away when dispatch never
/// produced a response.
struct StatsGuard {
    stats: Arc<dyn StatsSink>,
    url: String,
    source: String,
    started: Instant,
    bytes: Arc<AtomicU64>,
}

impl Drop for StatsGuard {
    fn drop(&mut self) {
        self.stats.record_request(
            &self.url,
            &self.source,
            self.bytes.load(Ordering::Relaxed),
            self.started.elapsed(),
        );
    }
}

/// Dispatch a validated request upstream and pipe the response back
pub(crate) async fn forward_upstream(
    state: &AppState,
    method: Method,
    target: Url,
    source_host: &str,
    headers: HeaderMap,
    body: Body,
    mode: &'static str,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let target_str = target.to_string();

    // Every attempt is reported, with zero bytes when dispatch fails
    // before a response exists.
    let counted = Arc::new(AtomicU64::new(0));
    let guard = StatsGuard {
        stats: state.stats.clone(),
        url: target_str.clone(),
        source: source_host.to_string(),
        started,
        bytes: counted.clone(),
    };

    let upstream_body = UpstreamBody::wrap_stream(body.into_data_stream());
    let response = state
        .client
        .forward(method, target, &headers, upstream_body)
        .await
        .map_err(|err| {
            metrics::counter!("static_mirror_upstream_failures_total").increment(1);
            warn!(url = %target_str, error = %err, "upstream dispatch failed");
            ApiError::from(err)
        })?;

    metrics::counter!("static_mirror_forwards_total", "mode" => mode).increment(1);

    let status = response.status();
    let content_length = response.content_length().unwrap_or(0);

    // Copy everything except Content-Length, which is recomputed for the
    // streamed body.
    let mut response_headers = HeaderMap::new();
    for (name, value) in response.headers() {
        if name != header::CONTENT_LENGTH {
            response_headers.append(name.clone(), value.clone());
        }
    }
    apply_cache_headers(&state.strategy, &mut response_headers, content_length);

    let stream = response.bytes_stream().inspect(move |chunk| {
        // `guard` rides along with the stream and reports on drop
        let _ = &guard;
        if let Ok(chunk) = chunk {
            counted.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        }
    });

    let mut outbound = (status, Body::from_stream(stream)).into_response();
    *outbound.headers_mut() = response_headers;
    Ok(outbound)
}

/// Apply the cache-control decision engine to an outbound header map that
/// already carries the upstream's headers.
///
/// An upstream `Cache-Control` passes through untouched; `Expires` is
/// synthesized when absent from whatever `Cache-Control` is in effect.
/// `ETag` and `Last-Modified` arrive via the plain header copy and are
/// never synthesized here.
pub(crate) fn apply_cache_headers(
    strategy: &CacheStrategy,
    headers: &mut HeaderMap,
    content_length: u64,
) {
    let cache_control = if let Some(existing) = headers.get(header::CACHE_CONTROL) {
        existing.to_str().unwrap_or("").to_string()
    } else {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let computed = strategy.cache_control(content_type, content_length);
        if let Ok(value) = HeaderValue::from_str(&computed) {
            headers.insert(header::CACHE_CONTROL, value);
        }
        computed
    };

    if !headers.contains_key(header::EXPIRES)
        && let Ok(expires) = HeaderValue::from_str(&strategy.expires(&cache_control))
    {
        headers.insert(header::EXPIRES, expires);
    }

    // Policy headers only; bodies are never served from the cache here.
    headers.insert("x-mirror-cache", HeaderValue::from_static("MISS"));
}
