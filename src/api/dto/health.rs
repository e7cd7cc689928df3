//! DTOs for the health endpoint.

use serde::Serialize;

/// Service health summary.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency responds, `degraded` otherwise.
    pub status: &'static str,
    pub database: bool,
    pub cache: bool,
    /// Free slots in the analytics queue.
    pub access_queue_headroom: usize,
}
