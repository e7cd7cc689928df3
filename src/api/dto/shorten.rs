//! DTOs for the mapping-creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::UrlRecord;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS, ≤ 2048 chars).
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional lifetime in seconds, capped at ten years. Passing this
    /// always creates a fresh record, even when the URL was already
    /// shortened.
    #[validate(range(min = 1, max = 315360000, message = "expires_in out of range"))]
    pub expires_in: Option<u64>,
}

/// Response for a created or reused mapping.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    /// True when an existing mapping was reused instead of created.
    pub is_existing: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn from_record(record: UrlRecord, base_url: &str, is_existing: bool) -> Self {
        let short_url = format!("{}/{}", base_url.trim_end_matches('/'), record.short_code);
        Self {
            short_code: record.short_code,
            short_url,
            original_url: record.original_url,
            is_existing,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
