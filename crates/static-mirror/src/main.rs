//! Static Mirror - streaming mirror and proxy for static-asset CDNs

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use mirror_api::{AppState, MetricsHandle, create_router};
use mirror_core::cache::SWEEP_INTERVAL;
use mirror_core::{
    BlockList, CoreError, MemoryCache, MemoryStats, NoopStats, ObjectCache, PurgeLimiter,
    SourceRegistry, StatsSink, spawn_sweep_task,
};
use mirror_proxy::{ForwardClient, ForwardClientConfig};

/// Static Mirror - streaming mirror and proxy for static-asset CDNs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "STATIC_MIRROR_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "STATIC_MIRROR_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Static Mirror v{}", env!("CARGO_PKG_VERSION"));

    // Install the Prometheus recorder
    let metrics_handle = Arc::new(MetricsHandle::new(
        PrometheusBuilder::new().install_recorder()?,
    ));

    // Access policy
    let sources = Arc::new(SourceRegistry::new(config.sources.clone()));
    let blocklist = Arc::new(BlockList::new(config.security.blocked_urls.clone()));

    // Response cache backend
    let cache: Option<Arc<dyn ObjectCache>> = if config.cache.enabled {
        match config.cache.backend.as_str() {
            "memory" => {
                let memory = Arc::new(MemoryCache::new(config.cache.memory.max_entries));
                spawn_sweep_task(memory.clone(), SWEEP_INTERVAL);
                info!(
                    max_entries = config.cache.memory.max_entries,
                    "In-memory cache enabled"
                );
                Some(memory)
            }
            other => return Err(CoreError::UnsupportedBackend(other.to_string()).into()),
        }
    } else {
        None
    };

    // Statistics sink
    let stats: Arc<dyn StatsSink> = if config.stats.enabled {
        Arc::new(MemoryStats::new())
    } else {
        Arc::new(NoopStats)
    };

    // Upstream client
    let client = Arc::new(ForwardClient::new(ForwardClientConfig::default())?);

    // Create application state
    let state = AppState {
        sources,
        blocklist,
        strategy: Arc::new(config.cache.strategy.clone()),
        purge: Arc::new(PurgeLimiter::new(&config.cache.purge)),
        purge_enabled: config.cache.purge.enabled,
        cache,
        stats,
        client,
        proxy_source: config.proxy.default_source.clone(),
    };

    // Create router
    let app = create_router(state, Some(metrics_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Default source: {}", config.proxy.default_source);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
