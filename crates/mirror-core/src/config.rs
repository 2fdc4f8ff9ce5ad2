//! Source allow-list and block rules
//!
//! These are loaded once at startup and handed to the components that
//! need them by constructor injection. Lookups are pure: a non-matching
//! host or URL simply resolves to "not allowed" / "not blocked", there
//! is no unknown state.

use serde::{Deserialize, Serialize};

/// A single allow-listed upstream host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Unique identifier for the source
    pub name: String,
    /// Upstream host, matched exactly and case-sensitively
    pub domain: String,
    /// Whether this source may be forwarded to
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Static allow-list of upstream hosts
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new(entries: Vec<SourceEntry>) -> Self {
        Self { entries }
    }

    /// True iff some enabled entry has `domain == host` exactly.
    /// No suffix or prefix matching is performed.
    pub fn is_allowed(&self, host: &str) -> bool {
        self.entries.iter().any(|s| s.enabled && s.domain == host)
    }

    /// Look up an enabled source by its domain
    pub fn get(&self, host: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|s| s.enabled && s.domain == host)
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }
}

/// Path segments that are never proxied, regardless of source.
/// Covers authentication and administrative surfaces of the upstreams.
const BLOCKED_PATHS: &[&str] = &[
    "/",
    "/login",
    "/signin",
    "/signup",
    "/register",
    "/account",
    "/user",
    "/profile",
    "/settings",
    "/admin",
    "/dashboard",
    "/auth",
    "/oauth",
];

/// URL-substring and path-prefix denial rules
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    url_patterns: Vec<String>,
}

impl BlockList {
    pub fn new(url_patterns: Vec<String>) -> Self {
        Self { url_patterns }
    }

    /// True iff any configured pattern is a substring of the literal URL.
    /// The comparison is case-sensitive and operates on the unescaped string.
    pub fn is_blocked_url(&self, url: &str) -> bool {
        self.url_patterns.iter().any(|p| url.contains(p))
    }

    /// True iff the path case-insensitively equals a blocked segment or has
    /// one as a prefix followed by a slash.
    pub fn is_blocked_path(&self, path: &str) -> bool {
        let lowered = path.to_ascii_lowercase();
        BLOCKED_PATHS
            .iter()
            .any(|blocked| lowered == *blocked || lowered.starts_with(&format!("{blocked}/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SourceRegistry {
        SourceRegistry::new(vec![
            SourceEntry {
                name: "jsdelivr".to_string(),
                domain: "cdn.jsdelivr.net".to_string(),
                enabled: true,
            },
            SourceEntry {
                name: "unpkg".to_string(),
                domain: "unpkg.com".to_string(),
                enabled: false,
            },
        ])
    }

    #[test]
    fn allows_exact_enabled_host_only() {
        let registry = registry();
        assert!(registry.is_allowed("cdn.jsdelivr.net"));
        assert!(!registry.is_allowed("unpkg.com")); // disabled
        assert!(!registry.is_allowed("example.com"));
    }

    #[test]
    fn no_suffix_or_prefix_host_matching() {
        let registry = registry();
        assert!(!registry.is_allowed("cdn.jsdelivr.net.evil.com"));
        assert!(!registry.is_allowed("evil-cdn.jsdelivr.net"));
        assert!(!registry.is_allowed("jsdelivr.net"));
    }

    #[test]
    fn host_match_is_case_sensitive() {
        assert!(!registry().is_allowed("CDN.jsdelivr.net"));
    }

    #[test]
    fn blocked_url_is_substring_match() {
        let blocklist = BlockList::new(vec!["malware".to_string(), "/private/".to_string()]);
        assert!(blocklist.is_blocked_url("https://cdn.jsdelivr.net/npm/malware@1.0/index.js"));
        assert!(blocklist.is_blocked_url("https://unpkg.com/private/key.pem"));
        assert!(!blocklist.is_blocked_url("https://cdn.jsdelivr.net/npm/react@18/index.js"));
        // case-sensitive
        assert!(!blocklist.is_blocked_url("https://cdn.jsdelivr.net/npm/Malware@1.0/index.js"));
    }

    #[test]
    fn empty_blocklist_blocks_nothing() {
        assert!(!BlockList::default().is_blocked_url("https://example.com/anything"));
    }

    #[test]
    fn blocked_paths_match_exact_and_prefix() {
        let blocklist = BlockList::default();
        assert!(blocklist.is_blocked_path("/login"));
        assert!(blocklist.is_blocked_path("/Login"));
        assert!(blocklist.is_blocked_path("/admin/users"));
        assert!(blocklist.is_blocked_path("/"));
        assert!(!blocklist.is_blocked_path("/loginx"));
        assert!(!blocklist.is_blocked_path("/npm/react@18/index.js"));
    }
}
