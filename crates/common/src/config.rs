//! Server configuration types.

use serde::{Deserialize, Serialize};

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream poll feed.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Snapshot cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP API parameters.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Poll feed URL.
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long an aggregate stays fresh before a refetch (seconds).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_feed_url() -> String {
    "https://static01.nytimes.com/newsgraphics/2023-polling-averages/418de109-7a6f-407f-b32e-ef0d2290c293/_assets/data/harris/interactive/2024/us/elections/polls-president/polls-0.json".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_bind_addr() -> String {
    "0.0.0.0:4000".into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
