//! Proxy error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    /// True when the failure happened while constructing the request
    /// rather than talking to the upstream
    pub fn is_request_construction(&self) -> bool {
        match self {
            ProxyError::Http(e) => e.is_builder(),
        }
    }
}
