// Application configuration, read from the environment
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PISTON_URL: &str = "http://localhost:2000/api/v2";
pub const DEFAULT_RUNTIME_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 5.0;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_API_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the execution service, without trailing slash
    pub piston_url: String,
    pub runtime_cache_ttl: Duration,
    pub compile_timeout_ms: u64,
    /// Used when a caller passes no time limit (or a non-positive one)
    pub default_time_limit_secs: f64,
    pub http_timeout: Duration,
    pub api_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            piston_url: DEFAULT_PISTON_URL.to_string(),
            runtime_cache_ttl: Duration::from_secs(DEFAULT_RUNTIME_CACHE_TTL_SECS),
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
            default_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            api_addr: DEFAULT_API_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let piston_url = lookup("PISTON_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.piston_url);

        let api_addr = lookup("API_ADDR")
            .filter(|addr| !addr.is_empty())
            .unwrap_or(defaults.api_addr);

        Self {
            piston_url,
            runtime_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "RUNTIME_CACHE_TTL_SECS",
                DEFAULT_RUNTIME_CACHE_TTL_SECS,
            )),
            compile_timeout_ms: parse_or(&lookup, "COMPILE_TIMEOUT_MS", DEFAULT_COMPILE_TIMEOUT_MS),
            default_time_limit_secs: positive_secs(parse_or(
                &lookup,
                "DEFAULT_TIME_LIMIT_SECS",
                DEFAULT_TIME_LIMIT_SECS,
            )),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            api_addr,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Invalid config value, using default");
            default
        }),
        None => default,
    }
}

/// The default limit must produce a usable run timeout
fn positive_secs(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        warn!(value = secs, "DEFAULT_TIME_LIMIT_SECS must be a positive number, using default");
        DEFAULT_TIME_LIMIT_SECS
    }
}
