//! In-memory test doubles and state builders shared by the integration
//! tests. No Postgres or Redis instance is required.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;

use snaplink::application::services::{GuardConfig, RateGuard, ResolverService, StatsService};
use snaplink::domain::entities::{AccessEvent, NewUrlRecord, UrlRecord, UrlStats};
use snaplink::domain::repositories::UrlRepository;
use snaplink::error::AppError;
use snaplink::infrastructure::cache::{CacheResult, CacheService};
use snaplink::state::AppState;

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

/// Single-process stand-in for the shared cache. TTLs are enforced against
/// the real clock on read, matching Redis semantics closely enough for the
/// cache-aside and fixed-window tests.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(entries: &mut HashMap<String, CacheEntry>, key: &str) -> Option<String> {
        match entries.get(key) {
            Some(entry) if entry.expires_at.is_none_or(|t| Instant::now() < t) => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Raw read without expiry bookkeeping, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|e| e.value.clone())
    }

    /// Stores a value with no expiry, modeling a counter whose TTL was lost.
    pub fn set_persistent(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Whether the key currently carries an expiry, for assertions.
    pub fn has_expiry(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.get(key).is_some_and(|e| e.expires_at.is_some())
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live_value(&mut entries, key))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr_with_expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<Option<u64>> {
        let mut entries = self.entries.lock().unwrap();

        let next = match Self::live_value(&mut entries, key) {
            Some(current) => current.parse::<u64>().unwrap_or(0) + 1,
            None => 1,
        };

        // Fixed window with self-healing: a key without an expiry gets one,
        // a live window is never extended.
        let expires_at = match entries.get(key).and_then(|e| e.expires_at) {
            Some(existing) => Some(existing),
            None => Some(Instant::now() + Duration::from_secs(ttl_seconds)),
        };

        entries.insert(
            key.to_string(),
            CacheEntry {
                value: next.to_string(),
                expires_at,
            },
        );

        Ok(Some(next))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct RepoInner {
    records: Vec<UrlRecord>,
    events: Vec<AccessEvent>,
    next_id: i64,
}

/// In-memory durable store honoring the same contract as the Postgres
/// implementation: active-only code uniqueness, expiry filtering on reads,
/// and the click-count bump on event insertion.
#[derive(Default)]
pub struct MemoryUrlRepository {
    inner: Mutex<RepoInner>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn insert_if_unique_code(&self, record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut inner = self.inner.lock().unwrap();

        let taken = inner
            .records
            .iter()
            .any(|r| r.is_active && r.short_code == record.short_code);
        if taken {
            return Err(AppError::conflict(
                "Short code already in use",
                json!({ "code": record.short_code }),
            ));
        }

        inner.next_id += 1;
        let stored = UrlRecord {
            id: inner.next_id,
            short_code: record.short_code,
            original_url: record.original_url,
            created_at: Utc::now(),
            expires_at: record.expires_at,
            click_count: 0,
            last_accessed_at: None,
            creator_ip: record.creator_ip,
            is_active: true,
        };
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .records
            .iter()
            .find(|r| r.short_code == code && r.is_resolvable(now))
            .cloned())
    }

    async fn find_active_by_url(&self, url: &str) -> Result<Option<UrlRecord>, AppError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .records
            .iter()
            .filter(|r| r.original_url == url && r.is_resolvable(now))
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn soft_delete(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        for record in inner.records.iter_mut() {
            if record.short_code == code && record.is_active {
                record.is_active = false;
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn insert_access_event(&self, event: AccessEvent) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        let Some(record) = inner.records.iter_mut().find(|r| r.id == event.url_id) else {
            return Err(AppError::dependency_unavailable(
                "access event references unknown record",
            ));
        };
        record.click_count += 1;
        record.last_accessed_at = Some(event.accessed_at);

        inner.events.push(event);
        Ok(())
    }

    async fn aggregate_analytics(&self, code: &str) -> Result<Option<UrlStats>, AppError> {
        let inner = self.inner.lock().unwrap();

        let Some(record) = inner
            .records
            .iter()
            .filter(|r| r.short_code == code)
            .max_by_key(|r| r.id)
        else {
            return Ok(None);
        };

        let total_clicks = inner
            .events
            .iter()
            .filter(|e| e.url_id == record.id)
            .count() as i64;
        let unique_visitors = inner
            .events
            .iter()
            .filter(|e| e.url_id == record.id)
            .filter_map(|e| e.ip_address.as_deref())
            .collect::<std::collections::HashSet<_>>()
            .len() as i64;

        Ok(Some(UrlStats {
            record: record.clone(),
            total_clicks,
            unique_visitors,
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Builds a fully wired [`AppState`] backed by in-memory doubles, returning
/// the receiver end of the analytics queue so tests can inspect or drain it.
pub fn test_state(
    repository: Arc<MemoryUrlRepository>,
    cache: Arc<MemoryCache>,
    guard_config: GuardConfig,
    cache_ttl_seconds: u64,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<AccessEvent>) {
    let repository: Arc<dyn UrlRepository> = repository;
    let cache: Arc<dyn CacheService> = cache;

    let resolver = Arc::new(ResolverService::new(
        repository.clone(),
        cache.clone(),
        cache_ttl_seconds,
    ));
    let guard = Arc::new(RateGuard::new(cache.clone(), guard_config));
    let stats = Arc::new(StatsService::new(repository.clone()));

    let (access_tx, access_rx) = mpsc::channel(queue_capacity);

    let state = AppState {
        resolver,
        guard,
        stats,
        repository,
        cache,
        access_tx,
        base_url: "http://localhost:3000".to_string(),
        behind_proxy: false,
    };

    (state, access_rx)
}
