//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Shared, TTL-expiring key-value store reachable by every server instance.
///
/// Holds both the mapping cache (`short:{code}`, `url:{originalUrl}`) and
/// all rate/abuse state (`ratelimit:*`, `abuse:{ip}`, `blocked:{ip}`).
///
/// Implementations must be fail-open: a backend error is logged and degrades
/// to a miss (`Ok(None)`) or a no-op (`Ok(())`), never an error the request
/// path has to handle. When caching is administratively disabled every
/// operation is a safe no-op ([`crate::infrastructure::cache::NullCache`]).
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `Ok(None)` on miss or on backend error (fail-open).
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` with a TTL in seconds.
    ///
    /// Backend errors are logged and swallowed.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Removes `key`. Used for invalidation after delete; a transient
    /// failure leaves a stale entry that self-heals at TTL expiry.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Atomically increments the counter at `key` and ensures it carries an
    /// expiry: `ttl_seconds` is set when the key has none (the increment
    /// that creates the window, or a counter whose expiry was lost), and a
    /// live window is never extended.
    ///
    /// Returns the post-increment value, or `Ok(None)` when the backend is
    /// unavailable or caching is disabled - callers treat that as
    /// "unenforceable, allow" (fail-open).
    async fn incr_with_expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<Option<u64>>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
