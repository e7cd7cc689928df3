//! End-to-end resolution behavior over in-memory backends: idempotent
//! creation, cache-aside round trips, deletion, and logical expiry.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use snaplink::application::services::ResolverService;
use snaplink::error::AppError;
use snaplink::utils::cache_keys::{short_key, url_key};

use common::{MemoryCache, MemoryUrlRepository};

fn resolver(
    repository: &Arc<MemoryUrlRepository>,
    cache: &Arc<MemoryCache>,
    ttl: u64,
) -> ResolverService {
    ResolverService::new(repository.clone(), cache.clone(), ttl)
}

#[tokio::test]
async fn test_create_is_idempotent_per_url() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (first, is_existing) = resolver
        .create_mapping("https://example.com/article", None, None)
        .await
        .unwrap();
    assert!(!is_existing);

    let (second, is_existing) = resolver
        .create_mapping("https://example.com/article", None, None)
        .await
        .unwrap();

    assert!(is_existing);
    assert_eq!(second.short_code, first.short_code);
    assert_eq!(repository.record_count(), 1);
}

#[tokio::test]
async fn test_explicit_expiry_forces_new_record() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (first, _) = resolver
        .create_mapping("https://example.com/article", None, None)
        .await
        .unwrap();

    let (second, is_existing) = resolver
        .create_mapping("https://example.com/article", None, Some(3_600))
        .await
        .unwrap();

    assert!(!is_existing);
    assert_ne!(second.short_code, first.short_code);
    assert!(second.expires_at.is_some());
    assert_eq!(repository.record_count(), 2);
}

#[tokio::test]
async fn test_resolve_round_trip_preserves_normalized_url() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (created, _) = resolver
        .create_mapping("HTTPS://Example.COM/Page?q=1#frag", None, None)
        .await
        .unwrap();

    let resolved = resolver.resolve(&created.short_code).await.unwrap();

    // Host lowercased, fragment stripped, path case preserved.
    assert_eq!(resolved.original_url, "https://example.com/Page?q=1");
    assert_eq!(resolved.original_url, created.original_url);
}

#[tokio::test]
async fn test_delete_invalidates_cache_and_store() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (created, _) = resolver
        .create_mapping("https://example.com/doomed", None, None)
        .await
        .unwrap();

    // Warm both cache directions.
    resolver.resolve(&created.short_code).await.unwrap();
    assert!(cache.peek(&short_key(&created.short_code)).is_some());
    assert!(cache.peek(&url_key(&created.original_url)).is_some());

    let deleted = resolver.delete_mapping(&created.short_code).await.unwrap();
    assert!(!deleted.is_active);

    assert!(cache.peek(&short_key(&created.short_code)).is_none());
    assert!(cache.peek(&url_key(&created.original_url)).is_none());

    let result = resolver.resolve(&created.short_code).await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));

    // Soft delete keeps the row.
    assert_eq!(repository.record_count(), 1);
}

#[tokio::test]
async fn test_delete_unknown_code_is_not_found() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let result = resolver.delete_mapping("missing7").await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_expired_record_stops_resolving() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (created, _) = resolver
        .create_mapping("https://example.com/ephemeral", None, Some(1))
        .await
        .unwrap();

    resolver.resolve(&created.short_code).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_200)).await;

    // The cache TTL was capped at the record's remaining lifetime, so the
    // entry is gone and the store filters out the expired record.
    let result = resolver.resolve(&created.short_code).await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));

    // Logical expiry: the row stays present and active until a cleanup pass.
    use snaplink::domain::repositories::UrlRepository;
    let stats = repository
        .aggregate_analytics(&created.short_code)
        .await
        .unwrap()
        .unwrap();
    assert!(stats.record.is_active);
    assert_eq!(repository.record_count(), 1);
}

#[tokio::test]
async fn test_cache_hit_within_ttl_skips_store_state() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = resolver(&repository, &cache, 86_400);

    let (created, _) = resolver
        .create_mapping("https://example.com/cached", None, None)
        .await
        .unwrap();
    resolver.resolve(&created.short_code).await.unwrap();

    // Flip the store directly, bypassing the resolver's invalidation. A
    // cached entry keeps serving until its TTL: availability over
    // freshness.
    use snaplink::domain::repositories::UrlRepository;
    repository.soft_delete(&created.short_code).await.unwrap();

    let still_resolved = resolver.resolve(&created.short_code).await.unwrap();
    assert_eq!(still_resolved.short_code, created.short_code);
}

#[tokio::test]
async fn test_concurrent_creates_yield_unique_codes() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let resolver = Arc::new(ResolverService::new(
        repository.clone(),
        cache.clone(),
        86_400,
    ));

    let mut handles = Vec::new();
    for i in 0..20 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            let url = format!("https://example.com/page/{}", i);
            let (record, _) = resolver.create_mapping(&url, None, None).await.unwrap();
            record.short_code
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap());
    }

    assert_eq!(codes.len(), 20);
    assert_eq!(repository.record_count(), 20);
}
