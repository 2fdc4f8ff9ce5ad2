//! URL rewriting: turn an absolute URL into its mirrored form

use axum::routing::post;
use axum::{Json, Router};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;

/// Query-string encoding: everything except unreserved characters
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Deserialize)]
pub(crate) struct ProcessRequest {
    url: String,
}

#[derive(Serialize)]
pub(crate) struct ProcessResponse {
    original_url: String,
    accelerated_url: String,
}

/// POST /api/process-url
pub(crate) async fn process_url(
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    Url::parse(&request.url)
        .map_err(|_| ApiError::BadRequest("invalid url format".to_string()))?;

    let accelerated_url = format!(
        "/mirror?url={}",
        utf8_percent_encode(&request.url, QUERY_ENCODE)
    );

    Ok(Json(ProcessResponse {
        original_url: request.url,
        accelerated_url,
    }))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/api/process-url", post(process_url))
}
