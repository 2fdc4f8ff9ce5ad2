//! Cache-control decision engine
//!
//! Derives `Cache-Control` and `Expires` values for forwarded responses
//! from the upstream content type, the content length and the configured
//! TTL strategy. Consulted once per forwarded response, never mutated by
//! request handling.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Small files are expected to change more often, so anything under this
/// size is cached without `immutable`.
const SMALL_FILE_LIMIT: u64 = 1024 * 1024;

/// Normalized file-type tag derived from a Content-Type header
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Css,
    Js,
    Image,
    Font,
    Video,
    Audio,
    Archive,
}

impl FileType {
    /// Classify a Content-Type by substring match against known MIME
    /// prefixes. Returns `None` for anything unrecognized.
    pub fn from_content_type(content_type: &str) -> Option<FileType> {
        if content_type.contains("text/css") {
            Some(FileType::Css)
        } else if content_type.contains("application/javascript")
            || content_type.contains("text/javascript")
        {
            Some(FileType::Js)
        } else if content_type.contains("image/") {
            Some(FileType::Image)
        } else if content_type.contains("font/") || content_type.contains("application/font") {
            Some(FileType::Font)
        } else if content_type.contains("video/") {
            Some(FileType::Video)
        } else if content_type.contains("audio/") {
            Some(FileType::Audio)
        } else if content_type.contains("application/zip")
            || content_type.contains("application/x-tar")
            || content_type.contains("application/x-rar")
        {
            Some(FileType::Archive)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Css => "css",
            FileType::Js => "js",
            FileType::Image => "image",
            FileType::Font => "font",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Archive => "archive",
        }
    }
}

/// TTL strategy for forwarded responses
///
/// All TTLs are in seconds. Per-file-type TTLs win over the size-based
/// branches; a large file wins over the small/normal split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStrategy {
    /// TTL per normalized file-type tag
    #[serde(default = "default_file_types")]
    pub file_types: HashMap<FileType, u64>,
    /// Responses larger than this many bytes use `large_file_ttl`
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,
    #[serde(default = "default_large_file_ttl")]
    pub large_file_ttl: u64,
    #[serde(default = "default_small_file_ttl")]
    pub small_file_ttl: u64,
    #[serde(default = "default_normal_file_ttl")]
    pub normal_file_ttl: u64,
    /// Fallback TTL when an upstream `Cache-Control` carries no usable
    /// `max-age` and `Expires` has to be synthesized anyway
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,
}

impl Default for CacheStrategy {
    fn default() -> Self {
        Self {
            file_types: default_file_types(),
            large_file_threshold: default_large_file_threshold(),
            large_file_ttl: default_large_file_ttl(),
            small_file_ttl: default_small_file_ttl(),
            normal_file_ttl: default_normal_file_ttl(),
            default_ttl: default_ttl(),
        }
    }
}

impl CacheStrategy {
    /// Compute a `Cache-Control` value for a response without one.
    ///
    /// Decision order, first match wins: configured file-type TTL, then
    /// the large-file threshold, then the sub-1-MiB small-file branch,
    /// then the normal-file default. A `content_length` of zero means
    /// the length is unknown and falls through to the default branch.
    pub fn cache_control(&self, content_type: &str, content_length: u64) -> String {
        if let Some(file_type) = FileType::from_content_type(content_type)
            && let Some(ttl) = self.file_types.get(&file_type)
        {
            return format!("public, max-age={ttl}, s-maxage={ttl}, immutable");
        }

        if content_length > self.large_file_threshold {
            let ttl = self.large_file_ttl;
            return format!("public, max-age={ttl}, s-maxage={ttl}, immutable");
        }

        if content_length > 0 && content_length < SMALL_FILE_LIMIT {
            let ttl = self.small_file_ttl;
            return format!("public, max-age={ttl}, s-maxage={ttl}");
        }

        let ttl = self.normal_file_ttl;
        format!("public, max-age={ttl}, s-maxage={ttl}")
    }

    /// Synthesize an `Expires` HTTP-date from the effective `Cache-Control`,
    /// falling back to the default TTL when no `max-age` is present.
    pub fn expires(&self, cache_control: &str) -> String {
        let max_age = extract_max_age(cache_control).unwrap_or(self.default_ttl);
        let expires_at = Utc::now() + chrono::Duration::seconds(max_age as i64);
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}

/// Extract the `max-age` directive from a `Cache-Control` value
pub fn extract_max_age(cache_control: &str) -> Option<u64> {
    cache_control
        .split(',')
        .filter_map(|part| part.trim().strip_prefix("max-age="))
        .find_map(|age| age.parse().ok())
}

fn default_file_types() -> HashMap<FileType, u64> {
    HashMap::from([
        (FileType::Css, 604_800),
        (FileType::Js, 604_800),
        (FileType::Image, 2_592_000),
        (FileType::Font, 2_592_000),
        (FileType::Video, 2_592_000),
        (FileType::Audio, 2_592_000),
        (FileType::Archive, 2_592_000),
    ])
}

fn default_large_file_threshold() -> u64 {
    10 * 1024 * 1024 // 10 MiB
}

fn default_large_file_ttl() -> u64 {
    2_592_000 // 30 days
}

fn default_small_file_ttl() -> u64 {
    3600 // 1 hour
}

fn default_normal_file_ttl() -> u64 {
    86_400 // 1 day
}

fn default_ttl() -> u64 {
    86_400
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> CacheStrategy {
        CacheStrategy::default()
    }

    #[test]
    fn file_type_classification() {
        assert_eq!(FileType::from_content_type("text/css; charset=utf-8"), Some(FileType::Css));
        assert_eq!(FileType::from_content_type("application/javascript"), Some(FileType::Js));
        assert_eq!(FileType::from_content_type("text/javascript"), Some(FileType::Js));
        assert_eq!(FileType::from_content_type("image/png"), Some(FileType::Image));
        assert_eq!(FileType::from_content_type("font/woff2"), Some(FileType::Font));
        assert_eq!(FileType::from_content_type("application/font-woff"), Some(FileType::Font));
        assert_eq!(FileType::from_content_type("application/x-tar"), Some(FileType::Archive));
        assert_eq!(FileType::from_content_type("application/octet-stream"), None);
        assert_eq!(FileType::from_content_type(""), None);
    }

    #[test]
    fn file_type_ttl_takes_precedence_over_size() {
        let strategy = strategy();
        let ttl = strategy.file_types[&FileType::Css];
        // A tiny stylesheet still gets the css TTL with immutable, not the
        // small-file branch.
        assert_eq!(
            strategy.cache_control("text/css", 500),
            format!("public, max-age={ttl}, s-maxage={ttl}, immutable")
        );
        // ... and so does one past the large-file threshold.
        assert_eq!(
            strategy.cache_control("text/css", strategy.large_file_threshold + 1),
            format!("public, max-age={ttl}, s-maxage={ttl}, immutable")
        );
    }

    #[test]
    fn large_files_are_immutable() {
        let strategy = strategy();
        let ttl = strategy.large_file_ttl;
        assert_eq!(
            strategy.cache_control("application/octet-stream", strategy.large_file_threshold + 1),
            format!("public, max-age={ttl}, s-maxage={ttl}, immutable")
        );
    }

    #[test]
    fn small_files_are_not_immutable() {
        let strategy = strategy();
        let ttl = strategy.small_file_ttl;
        assert_eq!(
            strategy.cache_control("application/octet-stream", 500_000),
            format!("public, max-age={ttl}, s-maxage={ttl}")
        );
    }

    #[test]
    fn unknown_or_midsized_lengths_use_normal_ttl() {
        let strategy = strategy();
        let ttl = strategy.normal_file_ttl;
        let expected = format!("public, max-age={ttl}, s-maxage={ttl}");
        // Unknown length
        assert_eq!(strategy.cache_control("application/octet-stream", 0), expected);
        // Between 1 MiB and the large-file threshold
        assert_eq!(strategy.cache_control("application/octet-stream", 2 * 1024 * 1024), expected);
    }

    #[test]
    fn max_age_extraction() {
        assert_eq!(extract_max_age("public, max-age=3600, s-maxage=3600"), Some(3600));
        assert_eq!(extract_max_age("max-age=0"), Some(0));
        assert_eq!(extract_max_age("no-cache"), None);
        assert_eq!(extract_max_age(""), None);
        // s-maxage alone does not count
        assert_eq!(extract_max_age("public, s-maxage=600"), None);
    }

    #[test]
    fn expires_is_http_date() {
        let value = strategy().expires("public, max-age=3600");
        assert!(value.ends_with("GMT"), "not an HTTP-date: {value}");
        // e.g. "Mon, 31 Aug 2026 12:00:00 GMT"
        assert_eq!(value.split(' ').count(), 6);
    }

    #[test]
    fn strategy_deserializes_from_toml() {
        let strategy: CacheStrategy = toml::from_str(
            r#"
            large_file_threshold = 1000000
            large_file_ttl = 100

            [file_types]
            css = 42
            image = 99
            "#,
        )
        .unwrap();
        assert_eq!(strategy.file_types[&FileType::Css], 42);
        assert_eq!(strategy.file_types[&FileType::Image], 99);
        assert_eq!(strategy.large_file_threshold, 1_000_000);
        assert_eq!(strategy.small_file_ttl, default_small_file_ttl());
    }
}
