//! Configuration loading and management

use anyhow::{Context, Result};
use mirror_core::{CacheStrategy, PurgeConfig, SourceEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Allow-listed upstream sources
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    /// URL substrings that are denied regardless of source
    #[serde(default)]
    pub blocked_urls: Vec<String>,
}

/// Path-proxy mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Source host implied when a request carries only a path
    #[serde(default = "default_proxy_source")]
    pub default_source: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            default_source: default_proxy_source(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default)]
    pub memory: MemoryCacheConfig,
    /// Cache-Control header policy applied to forwarded responses
    #[serde(default)]
    pub strategy: CacheStrategy,
    #[serde(default)]
    pub purge: PurgeConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: default_cache_backend(),
            memory: MemoryCacheConfig::default(),
            strategy: CacheStrategy::default(),
            purge: PurgeConfig::default(),
        }
    }
}

/// In-memory cache backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enabled")]
    pub enabled: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_stats_enabled(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_sources() -> Vec<SourceEntry> {
    vec![SourceEntry {
        name: "jsdelivr".to_string(),
        domain: "cdn.jsdelivr.net".to_string(),
        enabled: true,
    }]
}

fn default_proxy_source() -> String {
    "cdn.jsdelivr.net".to_string()
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

fn default_max_entries() -> usize {
    10_000
}

fn default_stats_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sources: default_sources(),
            security: SecurityConfig::default(),
            proxy: ProxyConfig::default(),
            cache: CacheConfig::default(),
            stats: StatsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.proxy.default_source, "cdn.jsdelivr.net");
        assert_eq!(config.cache.backend, "memory");
        assert!(!config.cache.enabled);
        assert!(!config.cache.purge.enabled);
        assert!(config.stats.enabled);
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn parses_a_partial_toml_file() {
        let toml_str = r#"
            [server]
            port = 9000

            [[sources]]
            name = "jsdelivr"
            domain = "cdn.jsdelivr.net"

            [[sources]]
            name = "unpkg"
            domain = "unpkg.com"
            enabled = false

            [security]
            blocked_urls = ["malware"]

            [cache]
            enabled = true

            [cache.purge]
            enabled = true
            rate_limit_minutes = 10
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.sources.len(), 2);
        assert!(config.sources[0].enabled);
        assert!(!config.sources[1].enabled);
        assert_eq!(config.security.blocked_urls, vec!["malware"]);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.backend, "memory");
        assert!(config.cache.purge.enabled);
        assert_eq!(config.cache.purge.rate_limit_minutes, 10);
        // Untouched sections fall back to defaults
        assert_eq!(config.cache.strategy.small_file_ttl, 3600);
        assert!(config.stats.enabled);
    }
}
