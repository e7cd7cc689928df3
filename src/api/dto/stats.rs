//! DTOs for the analytics endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{RecordStatus, UrlStats};

/// Aggregated analytics for one short code.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Derived lifecycle status: `active`, `expired`, or `deleted`.
    pub status: &'static str,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl StatsResponse {
    pub fn from_stats(stats: UrlStats) -> Self {
        let status = match stats.record.status_at(Utc::now()) {
            RecordStatus::Active => "active",
            RecordStatus::ExpiredLogical => "expired",
            RecordStatus::Deleted => "deleted",
        };

        Self {
            short_code: stats.record.short_code,
            original_url: stats.record.original_url,
            created_at: stats.record.created_at,
            expires_at: stats.record.expires_at,
            status,
            total_clicks: stats.total_clicks,
            unique_visitors: stats.unique_visitors,
            last_accessed_at: stats.record.last_accessed_at,
        }
    }
}

/// Response for a deleted mapping.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub short_code: String,
    pub original_url: String,
    pub status: &'static str,
}
