//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{AccessEvent, NewUrlRecord, UrlRecord, UrlStats};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

const RECORD_COLUMNS: &str = "id, short_code, original_url, created_at, expires_at, \
     click_count, last_accessed_at, creator_ip, is_active";

/// PostgreSQL repository for URL records and access events.
///
/// Insert-if-unique relies on the partial unique index over active short
/// codes; click counting is performed by the `access_events` insert trigger,
/// so the application never updates `click_count` itself.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert_if_unique_code(&self, record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let sql = format!(
            "INSERT INTO url_records (short_code, original_url, expires_at, creator_ip) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {RECORD_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(&record.short_code)
            .bind(&record.original_url)
            .bind(record.expires_at)
            .bind(&record.creator_ip)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(inserted)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM url_records \
             WHERE short_code = $1 \
               AND is_active \
               AND (expires_at IS NULL OR expires_at > now())"
        );

        let record = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(record)
    }

    async fn find_active_by_url(&self, url: &str) -> Result<Option<UrlRecord>, AppError> {
        // Concurrent creates can leave several active records for one URL;
        // the most recent wins.
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM url_records \
             WHERE original_url = $1 \
               AND is_active \
               AND (expires_at IS NULL OR expires_at > now()) \
             ORDER BY created_at DESC \
             LIMIT 1"
        );

        let record = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(record)
    }

    async fn soft_delete(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let sql = format!(
            "UPDATE url_records \
             SET is_active = FALSE \
             WHERE short_code = $1 AND is_active \
             RETURNING {RECORD_COLUMNS}"
        );

        let record = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(record)
    }

    async fn insert_access_event(&self, event: AccessEvent) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO access_events (url_id, accessed_at, ip_address, user_agent, referer) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.url_id)
        .bind(event.accessed_at)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(&event.referer)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn aggregate_analytics(&self, code: &str) -> Result<Option<UrlStats>, AppError> {
        // Stats stay readable for soft-deleted records; with active-only
        // uniqueness the most recent record for the code wins.
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM url_records \
             WHERE short_code = $1 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );

        let record = match sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?
        {
            Some(record) => record,
            None => return Ok(None),
        };

        let (total_clicks, unique_visitors): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT ip_address) \
             FROM access_events \
             WHERE url_id = $1",
        )
        .bind(record.id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Some(UrlStats {
            record,
            total_clicks,
            unique_visitors,
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
