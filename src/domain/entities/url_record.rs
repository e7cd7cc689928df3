//! URL record entity and its derived lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short-code to long-URL mapping.
///
/// Records are soft-deleted only: `is_active` flips to `false` exactly once
/// and never reverts, and rows are never physically removed. `click_count`
/// and `last_accessed_at` are mutated exclusively by the store-side trigger
/// that fires on access-event insertion.
///
/// Serialized as JSON when stored in the cache under `short:{code}` and
/// `url:{originalUrl}` keys.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub creator_ip: Option<String>,
    pub is_active: bool,
}

/// Lifecycle status derived at read time.
///
/// `ExpiredLogical` and `Active` are distinguished only by comparing
/// `expires_at` against the read clock; the store keeps `is_active = true`
/// for logically expired records until an external cleanup pass normalizes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    ExpiredLogical,
    Deleted,
}

impl UrlRecord {
    /// Derives the record status at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> RecordStatus {
        if !self.is_active {
            return RecordStatus::Deleted;
        }
        match self.expires_at {
            Some(expiry) if now >= expiry => RecordStatus::ExpiredLogical,
            _ => RecordStatus::Active,
        }
    }

    /// Returns true if the record currently resolves.
    pub fn is_resolvable(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == RecordStatus::Active
    }

    /// Seconds until logical expiry, if an expiry is set and still ahead.
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at.map(|expiry| {
            let remaining = (expiry - now).num_seconds();
            remaining.max(0) as u64
        })
    }
}

/// Input data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub creator_ip: Option<String>,
}

/// Aggregated analytics for a single record.
#[derive(Debug, Clone)]
pub struct UrlStats {
    pub record: UrlRecord,
    pub total_clicks: i64,
    pub unique_visitors: i64,
}
