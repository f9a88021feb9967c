//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Redis
//!
//! Either a full URL:
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! ```
//!
//! or individual components:
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! Caching stays disabled when neither `REDIS_URL` nor `REDIS_HOST` is set.
//!
//! ## Variables
//!
//! - `DATABASE_URL` - SQLite URL (default: `sqlite://url_shortener.db?mode=rwc`)
//! - `LISTEN` - Bind address (default: `0.0.0.0:8080`)
//! - `BASE_URL` - Public origin for short URLs (default: request `Host`)
//! - `CACHE_TTL_SECONDS` - Upper bound for cached links (default: 3600)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `CLICK_QUEUE_CAPACITY` - Click event buffer size (default: 10000, min: 100)
//! - `CLICK_WORKER_CONCURRENCY` - Clicks recorded in parallel (default: 4)
//! - `RATE_LIMIT_MAX_REQUESTS` - API requests per window (default: 10)
//! - `RATE_LIMIT_WINDOW_SECONDS` - Window length (default: 60)
//! - `GEOIP_ENABLED` - Look up public addresses (default: `true`)
//! - `GEOIP_API_URL` - Lookup URL template with `{ip}` (default: ip-api.com)
//! - `GEOIP_TIMEOUT_MS` - Lookup timeout (default: 2000)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `DB_CONNECT_TIMEOUT` - Pool acquire timeout in seconds (default: 30)

use anyhow::Result;
use std::env;
use std::str::FromStr;

use crate::domain::rate_limiter::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS};
use crate::infrastructure::geo::DEFAULT_API_URL;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://url_shortener.db?mode=rwc";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    /// Origin used for `shortUrl`; the request's `Host` is used when unset.
    pub base_url: Option<String>,
    pub log_level: String,
    pub log_format: String,
    /// Upper bound (seconds) for cached links. Has no effect without Redis.
    pub cache_ttl_seconds: u64,
    pub click_queue_capacity: usize,
    /// Maximum number of click events recorded concurrently by the background worker.
    pub click_worker_concurrency: usize,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: i64,
    /// When false, only local and private addresses are classified; everything else is `Unknown`.
    pub geoip_enabled: bool,
    pub geoip_api_url: String,
    pub geoip_timeout_ms: u64,

    // SqlitePool settings
    pub db_max_connections: u32,
    pub db_connect_timeout: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unparsable numeric values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible so required settings can be added.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let redis_url = Self::load_redis_url();
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let base_url = env::var("BASE_URL").ok().filter(|v| !v.trim().is_empty());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let geoip_enabled = env::var("GEOIP_ENABLED")
            .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
            .unwrap_or(true);
        let geoip_api_url =
            env::var("GEOIP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            database_url,
            redis_url,
            listen_addr,
            base_url,
            log_level,
            log_format,
            cache_ttl_seconds: parse_or("CACHE_TTL_SECONDS", 3600),
            click_queue_capacity: parse_or("CLICK_QUEUE_CAPACITY", 10_000),
            click_worker_concurrency: parse_or("CLICK_WORKER_CONCURRENCY", 4),
            rate_limit_max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS),
            rate_limit_window_seconds: parse_or(
                "RATE_LIMIT_WINDOW_SECONDS",
                DEFAULT_WINDOW_SECONDS,
            ),
            geoip_enabled,
            geoip_api_url,
            geoip_timeout_ms: parse_or("GEOIP_TIMEOUT_MS", 2000),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5),
            db_connect_timeout: parse_or("DB_CONNECT_TIMEOUT", 30),
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()) {
            Some(pwd) => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            None => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending variable.
    pub fn validate(&self) -> Result<()> {
        if self.click_queue_capacity < 100 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY must be at least 100, got {}",
                self.click_queue_capacity
            );
        }

        if self.click_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "CLICK_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.click_queue_capacity
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database_url
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                redis_url
            );
        }

        if let Some(ref base_url) = self.base_url
            && !base_url.starts_with("http://")
            && !base_url.starts_with("https://")
        {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                base_url
            );
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("CACHE_TTL_SECONDS must be greater than 0");
        }

        if self.click_worker_concurrency == 0 || self.click_worker_concurrency > 256 {
            anyhow::bail!(
                "CLICK_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.click_worker_concurrency
            );
        }

        if self.rate_limit_max_requests == 0 {
            anyhow::bail!("RATE_LIMIT_MAX_REQUESTS must be at least 1");
        }
        if self.rate_limit_window_seconds <= 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECONDS must be greater than 0");
        }

        if self.geoip_enabled && !self.geoip_api_url.contains("{ip}") {
            anyhow::bail!(
                "GEOIP_API_URL must contain an '{{ip}}' placeholder, got '{}'",
                self.geoip_api_url
            );
        }
        if self.geoip_timeout_ms == 0 {
            anyhow::bail!("GEOIP_TIMEOUT_MS must be greater than 0");
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_connect_timeout == 0 {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be greater than 0");
        }

        Ok(())
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Database: {}", self.database_url);
        tracing::info!(
            "  Base URL: {}",
            self.base_url.as_deref().unwrap_or("(request Host)")
        );

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Redis: {} (enabled)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Redis: disabled");
        }

        tracing::info!(
            "  Rate limit: {} requests / {}s",
            self.rate_limit_max_requests,
            self.rate_limit_window_seconds
        );
        tracing::info!(
            "  Geolocation: {}",
            if self.geoip_enabled { self.geoip_api_url.as_str() } else { "local only" }
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Click queue capacity: {}", self.click_queue_capacity);
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Masks the password in connection strings for logging.
///
/// `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// Expects `.env` to be loaded already (`dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn valid_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            redis_url: None,
            listen_addr: "0.0.0.0:8080".to_string(),
            base_url: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            cache_ttl_seconds: 3600,
            click_queue_capacity: 10_000,
            click_worker_concurrency: 4,
            rate_limit_max_requests: 10,
            rate_limit_window_seconds: 60,
            geoip_enabled: true,
            geoip_api_url: DEFAULT_API_URL.to_string(),
            geoip_timeout_ms: 2000,
            db_max_connections: 5,
            db_connect_timeout: 30,
        }
    }

    #[test]
    fn test_mask_connection_string() {
        assert_eq!(
            mask_connection_string("redis://:password@localhost:6379/0"),
            "redis://:***@localhost:6379/0"
        );

        assert_eq!(
            mask_connection_string("redis://localhost:6379/0"),
            "redis://localhost:6379/0"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.click_queue_capacity = 50;
        assert!(config.validate().is_err());
        config.click_queue_capacity = 10_000;

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "8080".to_string();
        assert!(config.validate().is_err());
        config.listen_addr = "0.0.0.0:8080".to_string();

        config.database_url = "postgres://localhost/test".to_string();
        assert!(config.validate().is_err());
        config.database_url = "sqlite://data.db".to_string();

        config.rate_limit_window_seconds = 0;
        assert!(config.validate().is_err());
        config.rate_limit_window_seconds = 60;

        config.base_url = Some("sho.rt".to_string());
        assert!(config.validate().is_err());
        config.base_url = Some("https://sho.rt".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_geoip_url_needs_placeholder_only_when_enabled() {
        let mut config = valid_config();
        config.geoip_api_url = "http://geo.local/lookup".to_string();
        assert!(config.validate().is_err());

        config.geoip_enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            for name in [
                "DATABASE_URL",
                "LISTEN",
                "BASE_URL",
                "REDIS_URL",
                "REDIS_HOST",
                "RATE_LIMIT_MAX_REQUESTS",
                "RATE_LIMIT_WINDOW_SECONDS",
                "GEOIP_ENABLED",
            ] {
                env::remove_var(name);
            }
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert!(config.base_url.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.rate_limit_max_requests, 10);
        assert_eq!(config.rate_limit_window_seconds, 60);
        assert!(config.geoip_enabled);
    }

    #[test]
    #[serial]
    fn test_numeric_and_flag_overrides() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("RATE_LIMIT_MAX_REQUESTS", "25");
            env::set_var("CLICK_WORKER_CONCURRENCY", "not-a-number");
            env::set_var("GEOIP_ENABLED", "false");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.rate_limit_max_requests, 25);
        assert_eq!(config.click_worker_concurrency, 4);
        assert!(!config.geoip_enabled);

        unsafe {
            env::remove_var("RATE_LIMIT_MAX_REQUESTS");
            env::remove_var("CLICK_WORKER_CONCURRENCY");
            env::remove_var("GEOIP_ENABLED");
        }
    }

    #[test]
    #[serial]
    fn test_load_redis_url_from_components() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::remove_var("REDIS_URL");
            env::set_var("REDIS_HOST", "redis-host");
            env::set_var("REDIS_PORT", "6380");
            env::set_var("REDIS_DB", "1");
        }

        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "secret");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://:secret@redis-host:6380/1");

        unsafe {
            env::set_var("REDIS_PASSWORD", "");
        }
        let url = Config::load_redis_url().unwrap();
        assert_eq!(url, "redis://redis-host:6380/1");

        unsafe {
            env::remove_var("REDIS_HOST");
            env::remove_var("REDIS_PORT");
            env::remove_var("REDIS_DB");
            env::remove_var("REDIS_PASSWORD");
        }
    }

    #[test]
    #[serial]
    fn test_redis_url_priority() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("REDIS_URL", "redis://from-url:6379/0");
            env::set_var("REDIS_HOST", "from-components");
        }

        let url = Config::load_redis_url().unwrap();

        assert!(url.contains("from-url"));
        assert!(!url.contains("from-components"));

        unsafe {
            env::remove_var("REDIS_URL");
            env::remove_var("REDIS_HOST");
        }
    }
}
