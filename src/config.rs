//! Configuration loader: merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.feed.url.trim().is_empty() {
        issues.push("feed.url must not be empty".into());
    } else if !config.feed.url.starts_with("http") {
        issues.push("feed.url must be an http(s) URL".into());
    }
    if config.feed.request_timeout_secs == 0 {
        issues.push("feed.request_timeout_secs must be > 0".into());
    }
    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.server.bind_addr.trim().is_empty() {
        issues.push("server.bind_addr must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load server configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(url) = std::env::var("POLLS_FEED_URL") {
        config.feed.url = url;
    }
    if let Ok(raw) = std::env::var("POLLS_REQUEST_TIMEOUT_SECS") {
        config.feed.request_timeout_secs = parse_positive_u64(&raw, "POLLS_REQUEST_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("POLLS_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "POLLS_CACHE_TTL_SECS")?;
    }
    if let Ok(addr) = std::env::var("POLLS_BIND_ADDR") {
        config.server.bind_addr = addr;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
