//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

const KEY_PREFIX: &str = "url:";

/// Redis cache for redirect lookups.
///
/// Uses `ConnectionManager` for automatic reconnection. Errors are returned to the caller,
/// which logs them and falls back to the link store.
pub struct RedisCache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_destination`] is called without a
    /// TTL (`CACHE_TTL_SECONDS`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot be
    /// established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        connection
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {e}")))?;

        info!(ttl_seconds = default_ttl_seconds, "Connected to Redis");

        Ok(Self {
            connection,
            default_ttl: default_ttl_seconds,
        })
    }

    fn key(slug: &str) -> String {
        format!("{KEY_PREFIX}{slug}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_destination(&self, slug: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();

        let cached = conn
            .get::<_, Option<String>>(Self::key(slug))
            .await
            .map_err(|e| CacheError::Operation(format!("GET failed: {e}")))?;

        debug!(slug, hit = cached.is_some(), "Cache lookup");
        Ok(cached)
    }

    async fn set_destination(
        &self,
        slug: &str,
        destination: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        conn.set_ex::<_, _, ()>(Self::key(slug), destination, ttl)
            .await
            .map_err(|e| CacheError::Operation(format!("SETEX failed: {e}")))?;

        debug!(slug, ttl, "Cache SET");
        Ok(())
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();

        let deleted = conn
            .del::<_, i64>(Self::key(slug))
            .await
            .map_err(|e| CacheError::Operation(format!("DEL failed: {e}")))?;

        if deleted > 0 {
            debug!(slug, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        conn.ping::<()>().await.is_ok()
    }
}
