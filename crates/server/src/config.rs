//! Startup configuration from the environment.

use std::time::Duration;

use tracing::warn;
use watchlog_metadata::cache::DEFAULT_TTL;
use watchlog_metadata::enrich::DEFAULT_CONCURRENCY;

pub const DEFAULT_DB_PATH: &str = "watchlog.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Movie/tv discovery is unavailable without it.
    pub tmdb_api_key: Option<String>,
    pub enrich_concurrency: usize,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let number = |key: &str, default: u64| parse_or(value(key), key, default);
        let enrich_concurrency =
            number("WATCHLOG_ENRICH_CONCURRENCY", DEFAULT_CONCURRENCY as u64).max(1) as usize;
        let cache_ttl = Duration::from_secs(number("WATCHLOG_CACHE_TTL_SECS", DEFAULT_TTL.as_secs()));

        Self {
            db_path: value("WATCHLOG_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            bind_addr: value("WATCHLOG_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            jwt_secret: value("WATCHLOG_JWT_SECRET")
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            tmdb_api_key: value("TMDB_API_KEY"),
            enrich_concurrency,
            cache_ttl,
        }
    }
}

fn parse_or(raw: Option<String>, key: &str, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        warn!(key, value = %raw, "ignoring unparsable setting");
        default
    })
}
