//! Repository trait for durable URL record storage.

use crate::domain::entities::{AccessEvent, NewUrlRecord, UrlRecord, UrlStats};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable store contract for URL records and access analytics.
///
/// The store is the single source of truth; its partial unique index on
/// active short codes is the only strict consistency guarantee in the
/// system.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record, relying on the store's uniqueness constraint on
    /// active short codes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken by an
    /// active record; callers convert this into another generation attempt.
    /// Returns [`AppError::DependencyUnavailable`] on other store errors.
    async fn insert_if_unique_code(&self, record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds the record for a short code, filtering to active, non-expired
    /// records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors - never
    /// `Ok(None)`, which would incorrectly imply the record does not exist.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Finds the most recently created active, non-expired record for an
    /// original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn find_active_by_url(&self, url: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Atomically flips `is_active` to false and returns the now-deleted
    /// record, or `None` if no active record matched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn soft_delete(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Appends one access event. The store bumps the owning record's
    /// `click_count` and `last_accessed_at` as an atomic side effect of the
    /// insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors; the
    /// access worker logs and drops the event.
    async fn insert_access_event(&self, event: AccessEvent) -> Result<(), AppError>;

    /// Aggregates analytics for a code: the record plus total clicks and
    /// distinct visitor IPs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn aggregate_analytics(&self, code: &str) -> Result<Option<UrlStats>, AppError>;

    /// Cheap connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), AppError>;
}
