//! Cache-aside resolution service: create, resolve, delete.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::application::services::code_generator::{CodeGenerator, MAX_ATTEMPTS};
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::cache_keys::{short_key, url_key};
use crate::utils::url_normalizer::normalize_url;

/// Upper bound for `expires_in`, ten years in seconds. Matches the request
/// DTO's range constraint and keeps the expiry arithmetic far away from
/// chrono's `TimeDelta` bounds.
pub const MAX_EXPIRES_IN_SECONDS: u64 = 315_360_000;

/// Implements the cache-aside protocol between the shared cache and the
/// durable store for both mapping directions (`short:{code}` and
/// `url:{originalUrl}`).
///
/// Ordering guarantees: cache population happens-after store commit within
/// `create_mapping`, and cache invalidation happens-after the store flips
/// `is_active` within `delete_mapping`. Concurrent creates of the same URL
/// may produce two records with distinct codes; both stay resolvable and the
/// last cache write wins (documented eventual-consistency trade-off, not a
/// bug).
pub struct ResolverService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    generator: CodeGenerator,
    default_ttl_seconds: u64,
}

impl ResolverService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        default_ttl_seconds: u64,
    ) -> Self {
        let generator = CodeGenerator::new(repository.clone());
        Self {
            repository,
            cache,
            generator,
            default_ttl_seconds,
        }
    }

    /// Creates a mapping for `original_url`, or reuses an existing one.
    ///
    /// Returns the record plus `is_existing`. A call without `expires_in` is
    /// idempotent: an active, non-expired record for the same normalized URL
    /// is returned with `is_existing = true`. An explicit `expires_in`
    /// always forces a new record, since the call asserts a different expiry
    /// intent.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for malformed, oversized, or non-HTTP(S)
    ///   URLs and for an `expires_in` of zero or above
    ///   [`MAX_EXPIRES_IN_SECONDS`]
    /// - [`AppError::DependencyUnavailable`] when the store is unreachable
    pub async fn create_mapping(
        &self,
        original_url: &str,
        creator_ip: Option<String>,
        expires_in: Option<u64>,
    ) -> Result<(UrlRecord, bool), AppError> {
        let normalized = normalize_url(original_url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        })?;

        match expires_in {
            Some(0) => {
                return Err(AppError::bad_request(
                    "expires_in must be greater than 0",
                    json!({ "expires_in": 0 }),
                ));
            }
            Some(secs) if secs > MAX_EXPIRES_IN_SECONDS => {
                return Err(AppError::bad_request(
                    "expires_in exceeds the maximum lifetime",
                    json!({ "expires_in": secs, "max": MAX_EXPIRES_IN_SECONDS }),
                ));
            }
            _ => {}
        }

        let existing = self.lookup_by_url(&normalized).await?;

        if let Some(record) = existing {
            if expires_in.is_none() {
                debug!("Reusing existing mapping {} for URL", record.short_code);
                return Ok((record, true));
            }
        }

        let expires_at = expires_in.map(|secs| Utc::now() + Duration::seconds(secs as i64));

        // A unique violation here means another writer (or another attempt)
        // claimed the code between the generator's check and our insert;
        // it is absorbed by generating again, never surfaced.
        for _ in 0..MAX_ATTEMPTS {
            let code = self.generator.generate().await?;

            let new_record = NewUrlRecord {
                short_code: code,
                original_url: normalized.clone(),
                expires_at,
                creator_ip: creator_ip.clone(),
            };

            match self.repository.insert_if_unique_code(new_record).await {
                Ok(record) => {
                    // Cache only after the store commit so a failed insert
                    // can never be served from cache.
                    self.populate_cache(&record).await;
                    metrics::counter!("mappings_created_total").increment(1);
                    return Ok((record, false));
                }
                Err(AppError::Conflict { .. }) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique short code",
            json!({ "attempts": MAX_ATTEMPTS }),
        ))
    }

    /// Resolves a short code to its record.
    ///
    /// A cache hit is returned immediately with no store access or
    /// consistency re-check: up-to-TTL staleness of `is_active`/`expires_at`
    /// is the deliberate availability-over-consistency trade-off. On a miss
    /// the store is queried filtering active, non-expired records, and the
    /// cache is repopulated.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] when the code is unknown, deleted, or
    ///   logically expired
    /// - [`AppError::DependencyUnavailable`] when the store is unreachable;
    ///   never silently converted to `NotFound`
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        let key = short_key(code);

        if let Some(record) = self.cached_record(&key).await {
            metrics::counter!("cache_hits_total").increment(1);
            return Ok(record);
        }
        metrics::counter!("cache_misses_total").increment(1);

        let record = self
            .repository
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "code": code }))
            })?;

        self.populate_cache(&record).await;

        Ok(record)
    }

    /// Soft-deletes a mapping and invalidates both cache keys.
    ///
    /// Invalidation is unconditional and runs synchronously after the store
    /// mutation completes, so no instance can serve a resurrected entry for
    /// a just-deleted code. A transient cache-delete failure is logged, not
    /// retried: the store is already correct and the stale entry self-heals
    /// at TTL expiry.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] when no active record matches
    /// - [`AppError::DependencyUnavailable`] when the store is unreachable
    pub async fn delete_mapping(&self, code: &str) -> Result<UrlRecord, AppError> {
        let record = self.repository.soft_delete(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        if let Err(e) = self.cache.delete(&short_key(code)).await {
            warn!("Cache invalidation failed for {}: {}", code, e);
        }
        if let Err(e) = self.cache.delete(&url_key(&record.original_url)).await {
            warn!("Cache invalidation failed for URL key: {}", e);
        }

        metrics::counter!("mappings_deleted_total").increment(1);
        Ok(record)
    }

    /// Cache-aside lookup on the `url:{originalUrl}` direction, repopulating
    /// the cache on a store hit.
    async fn lookup_by_url(&self, normalized: &str) -> Result<Option<UrlRecord>, AppError> {
        let key = url_key(normalized);

        if let Some(record) = self.cached_record(&key).await {
            return Ok(Some(record));
        }

        let found = self.repository.find_active_by_url(normalized).await?;

        if let Some(ref record) = found {
            self.populate_cache(record).await;
        }

        Ok(found)
    }

    /// Reads and deserializes a cached record. Corrupt entries are treated
    /// as misses.
    async fn cached_record(&self, key: &str) -> Option<UrlRecord> {
        let value = self.cache.get(key).await.ok().flatten()?;

        match serde_json::from_str(&value) {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Writes both mapping keys with the default TTL, capped at the time
    /// remaining to the record's expiry so a cached entry can never outlive
    /// its logical lifetime.
    async fn populate_cache(&self, record: &UrlRecord) {
        let ttl = match record.seconds_until_expiry(Utc::now()) {
            Some(0) => return,
            Some(remaining) => remaining.min(self.default_ttl_seconds),
            None => self.default_ttl_seconds,
        };

        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize record for cache: {}", e);
                return;
            }
        };

        let _ = self
            .cache
            .set_with_ttl(&short_key(&record.short_code), &payload, ttl)
            .await;
        let _ = self
            .cache
            .set_with_ttl(&url_key(&record.original_url), &payload, ttl)
            .await;
    }
}
