//! Static Mirror HTTP API
//!
//! This crate provides the Axum-based HTTP surface: the mirror and
//! path-proxy forwarding endpoints, the purge endpoint and the small
//! diagnostic API used by the frontend.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
