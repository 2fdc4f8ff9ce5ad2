//! API error types
//!
//! Maps the error taxonomy onto HTTP statuses: bad input is 400, policy
//! denials are 403, purge rate denials are 429, upstream transport
//! failures are 502 and request-construction failures are 500. Every
//! error is local to its request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("purge rate limited")]
    PurgeRateLimited { window_minutes: u64 },

    #[error("purge quota exceeded")]
    PurgeQuotaExceeded,

    #[error("upstream failure: {0}")]
    Upstream(#[from] mirror_proxy::ProxyError),

    #[error("core error: {0}")]
    Core(#[from] mirror_core::CoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid request", msg.clone())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::PurgeRateLimited { window_minutes } => (
                StatusCode::TOO_MANY_REQUESTS,
                "purge rate limited",
                format!("at most one purge per URL every {window_minutes} minutes"),
            ),
            ApiError::PurgeQuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "purge quota exceeded",
                "the maximum number of purge operations has been reached".to_string(),
            ),
            ApiError::Upstream(err) if err.is_request_construction() => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to construct upstream request",
                err.to_string(),
            ),
            ApiError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                "failed to reach upstream",
                err.to_string(),
            ),
            ApiError::Core(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
                err.to_string(),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error", msg.clone())
            }
        };

        let body = axum::Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::PurgeRateLimited { window_minutes: 30 }
                .into_response()
                .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::PurgeQuotaExceeded.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
