//! Upstream forwarding client and latency prober

use std::time::{Duration, Instant};

use http::{HeaderMap, Method, header};
use reqwest::{Body, Client, Response, Url};
use tracing::debug;

use crate::error::ProxyError;

/// Forwarding client configuration
#[derive(Clone, Debug)]
pub struct ForwardClientConfig {
    /// Overall timeout for a forwarded request, including the body copy
    pub timeout: Duration,
    /// Timeout for latency-probe requests
    pub probe_timeout: Duration,
    /// Bound on idle connections kept per upstream host
    pub max_idle_per_host: usize,
    /// How long an idle connection may linger in the pool
    pub idle_timeout: Duration,
}

impl Default for ForwardClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            max_idle_per_host: 100,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Shared client for upstream dispatch
///
/// One pooled client is reused across all forwarded requests; a second
/// client with a much shorter timeout serves the latency prober so a
/// slow probe target cannot tie resources up for 30 seconds.
pub struct ForwardClient {
    client: Client,
    probe: Client,
}

impl ForwardClient {
    pub fn new(config: ForwardClientConfig) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .build()?;

        let probe = Client::builder().timeout(config.probe_timeout).build()?;

        Ok(Self { client, probe })
    }

    /// Issue the upstream request and return the streaming response.
    ///
    /// All inbound headers are replayed except `Host` and
    /// `Content-Length`, which the client recomputes for the target URL.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        headers: &HeaderMap,
        body: Body,
    ) -> Result<Response, ProxyError> {
        debug!(%method, %url, "dispatching upstream request");

        let mut upstream_headers = HeaderMap::new();
        for (name, value) in headers {
            if name != header::HOST && name != header::CONTENT_LENGTH {
                upstream_headers.append(name.clone(), value.clone());
            }
        }

        let response = self
            .client
            .request(method, url)
            .headers(upstream_headers)
            .body(body)
            .send()
            .await?;

        Ok(response)
    }

    /// Issue a bare GET, drain the body and return the round-trip time in
    /// milliseconds
    pub async fn probe_latency(&self, url: &str) -> Result<u64, ProxyError> {
        let start = Instant::now();

        let mut response = self.probe.get(url).send().await?;
        // Drain chunk-by-chunk so the measurement covers the full
        // transfer without holding the payload in memory
        while response.chunk().await?.is_some() {}

        let latency = start.elapsed().as_millis() as u64;
        debug!(url, latency_ms = latency, "latency probe complete");
        Ok(latency)
    }
}
