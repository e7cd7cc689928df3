//! Health check handler.

use axum::{Json, extract::State};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Reports dependency health and analytics queue headroom.
///
/// # Endpoint
///
/// `GET /health`
///
/// Always answers `200`; consumers inspect the body. The guard is skipped
/// so orchestrators probing frequently are never throttled.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.repository.ping().await.is_ok();
    let cache = state.cache.health_check().await;

    let status = if database && cache { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        database,
        cache,
        access_queue_headroom: state.access_tx.capacity(),
    })
}
