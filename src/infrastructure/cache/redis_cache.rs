//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::Link;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache holding JSON-encoded links under `link:{code}`.
///
/// All operations are fail-open: backend errors are logged and reported as a
/// miss or a successful no-op.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` is the upper bound for every entry's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "link:".to_string(),
        })
    }

    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

/// Entry lifetime: the requested TTL, capped by the configured default.
fn effective_ttl(requested: Option<u64>, default_ttl: u64) -> u64 {
    requested
        .map(|ttl| ttl.min(default_ttl))
        .unwrap_or(default_ttl)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<Link>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Link>(&raw) {
                Ok(link) => {
                    debug!("Cache HIT: {}", short_code);
                    Ok(Some(link))
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry for {}: {}", short_code, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {}", short_code);
                Ok(None)
            }
            Err(e) => Err(CacheError::OperationError(format!(
                "GET {} failed: {}",
                short_code, e
            ))),
        }
    }

    async fn set_link(&self, link: &Link, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let ttl = effective_ttl(ttl_seconds, self.default_ttl);
        if ttl == 0 {
            return Ok(());
        }

        let key = self.build_key(&link.code);
        let payload = serde_json::to_string(link)
            .map_err(|e| CacheError::OperationError(format!("encode failed: {}", e)))?;
        let mut conn = self.client.clone();

        match conn.set_ex::<_, _, ()>(&key, payload, ttl).await {
            Ok(_) => {
                debug!("Cache SET: {} (TTL: {}s)", link.code, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", link.code, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ttl_uses_default_without_expiry() {
        assert_eq!(effective_ttl(None, 3600), 3600);
    }

    #[test]
    fn test_effective_ttl_never_outlives_link() {
        assert_eq!(effective_ttl(Some(90), 3600), 90);
        assert_eq!(effective_ttl(Some(7200), 3600), 3600);
        assert_eq!(effective_ttl(Some(0), 3600), 0);
    }
}
