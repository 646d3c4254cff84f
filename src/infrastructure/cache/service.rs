//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache for slug to destination lookups.
///
/// Destinations never change once a link exists, so a cached entry only goes stale when the
/// link is deleted; deletion calls [`CacheService::invalidate`]. Callers treat every error as
/// a miss and fall back to the link store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached destination for `slug`, `Ok(None)` on a miss.
    async fn get_destination(&self, slug: &str) -> CacheResult<Option<String>>;

    /// Caches `destination` for `slug`. `ttl_seconds = None` uses the implementation default.
    async fn set_destination(
        &self,
        slug: &str,
        destination: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Drops the entry for `slug`, if any.
    async fn invalidate(&self, slug: &str) -> CacheResult<()>;

    async fn health_check(&self) -> bool;
}
