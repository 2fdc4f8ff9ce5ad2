//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A cache backend failed. The in-memory backend never produces this;
    /// it exists for fallible external backends behind [`crate::ObjectCache`].
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("unsupported cache backend: {0}")]
    UnsupportedBackend(String),
}
