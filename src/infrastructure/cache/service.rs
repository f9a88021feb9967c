//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::Link;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache for redirect lookups.
///
/// Entries hold the whole [`Link`], so the caller can still apply the expiry
/// check to a cached value. Failures must degrade to a store lookup, never
/// fail a redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached link for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` on cache hit
    /// - `Ok(None)` on cache miss
    ///
    /// # Errors
    ///
    /// Implementations may report backend failures; callers treat them as misses.
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<Link>>;

    /// Stores a link.
    ///
    /// `ttl_seconds` caps the entry lifetime, typically the time left until
    /// the link expires. The implementation's default TTL applies when it is
    /// `None` or larger than the default.
    async fn set_link(&self, link: &Link, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
