//! Aggregate analytics lookups.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::UrlStats;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Read-side service for per-code analytics.
///
/// Aggregation always goes to the durable store; analytics reads are rare
/// compared to redirects and must reflect the trigger-maintained counters,
/// so they bypass the cache entirely.
pub struct StatsService {
    repository: Arc<dyn UrlRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn UrlRepository>) -> Self {
        Self { repository }
    }

    /// Returns the record plus total clicks and unique visitor count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code has never existed.
    pub async fn aggregate(&self, code: &str) -> Result<UrlStats, AppError> {
        self.repository
            .aggregate_analytics(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }
}
