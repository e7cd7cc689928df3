//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Per-operation deadline. A slow Redis degrades to a store round-trip
/// instead of stalling the request.
const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis cache backing both the mapping cache and the distributed rate/abuse
/// counters.
///
/// Uses `ConnectionManager` for connection reuse and reconnection. All
/// operations are fail-open: errors are logged and degrade to misses/no-ops.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
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

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        match tokio::time::timeout(OP_TIMEOUT, conn.get::<_, Option<String>>(key)).await {
            Ok(Ok(Some(value))) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(value))
            }
            Ok(Ok(None)) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Ok(Err(e)) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
            Err(_) => {
                error!("Redis GET timed out for {}", key);
                Ok(None)
            }
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match tokio::time::timeout(OP_TIMEOUT, conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await
        {
            Ok(Ok(())) => {
                debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
            Err(_) => {
                warn!("Redis SET timed out for {}", key);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match tokio::time::timeout(OP_TIMEOUT, conn.del::<_, i64>(key)).await {
            Ok(Ok(deleted)) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", key);
                }
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("Redis DEL error for {}: {}", key, e);
                Ok(())
            }
            Err(_) => {
                warn!("Redis DEL timed out for {}", key);
                Ok(())
            }
        }
    }

    async fn incr_with_expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<Option<u64>> {
        let mut conn = self.client.clone();

        let count: u64 = match tokio::time::timeout(OP_TIMEOUT, conn.incr(key, 1u64)).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                error!("Redis INCR error for {}: {}", key, e);
                return Ok(None);
            }
            Err(_) => {
                error!("Redis INCR timed out for {}", key);
                return Ok(None);
            }
        };

        // EXPIRE NX on every increment: the creating increment arms the
        // window, later increments never extend a live one, and a counter
        // whose expiry was lost (EXPIRE dropped after a successful INCR)
        // gets re-armed instead of persisting forever.
        let mut expire = redis::cmd("EXPIRE");
        expire.arg(key).arg(ttl_seconds as i64).arg("NX");
        match tokio::time::timeout(OP_TIMEOUT, expire.query_async::<()>(&mut conn)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Redis EXPIRE error for {}: {}", key, e),
            Err(_) => warn!("Redis EXPIRE timed out for {}", key),
        }

        Ok(Some(count))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        matches!(
            tokio::time::timeout(OP_TIMEOUT, conn.ping::<()>()).await,
            Ok(Ok(()))
        )
    }
}
