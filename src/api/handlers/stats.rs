//! Handler for per-code analytics.

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
};
use std::net::SocketAddr;

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Returns aggregate analytics for a short code.
///
/// # Endpoint
///
/// `GET /api/stats/{code}`
///
/// Reads go straight to the durable store so the trigger-maintained click
/// counters are always current.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let ip = client_ip(&headers, addr, state.behind_proxy);
    state.guard.check_request(&ip).await?;

    let stats = state.stats.aggregate(&code).await?;

    Ok(Json(StatsResponse::from_stats(stats)))
}
