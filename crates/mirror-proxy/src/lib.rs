//! Static Mirror Upstream Client
//!
//! This crate provides the HTTP plumbing towards the allow-listed
//! upstream hosts: the pooled forwarding client and the latency prober.

pub mod client;
pub mod error;

pub use client::{ForwardClient, ForwardClientConfig};
pub use error::ProxyError;

// Body and response types cross the crate boundary so the API layer can
// stream without depending on the HTTP client directly.
pub use reqwest::{Body as UpstreamBody, Response as UpstreamResponse};
