//! Access event model for asynchronous analytics recording.

use chrono::{DateTime, Utc};

/// One resolved redirect, captured for analytics.
///
/// Created in the redirect handler after the resolution result is
/// determined, pushed onto a bounded channel with `try_send`, and persisted
/// by the background access worker. The owning record does not track its
/// events; the store-side trigger bumps `click_count` and `last_accessed_at`
/// as an atomic consequence of the insert.
///
/// Delivery is at-most-once by design: a full queue or a failed insert drops
/// the event.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub url_id: i64,
    pub accessed_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl AccessEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        url_id: i64,
        ip_address: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            url_id,
            accessed_at: Utc::now(),
            ip_address,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}
