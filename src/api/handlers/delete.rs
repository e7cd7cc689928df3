//! Handler for mapping deletion.

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
};
use std::net::SocketAddr;

use crate::api::dto::stats::DeleteResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Soft-deletes a mapping and invalidates its cache entries.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// Returns the deleted mapping, or `404` if no active record matched. The
/// record is never physically removed; its analytics stay queryable.
pub async fn delete_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, AppError> {
    let ip = client_ip(&headers, addr, state.behind_proxy);
    state.guard.check_request(&ip).await?;

    let record = state.resolver.delete_mapping(&code).await?;

    Ok(Json(DeleteResponse {
        short_code: record.short_code,
        original_url: record.original_url,
        status: "deleted",
    }))
}
