//! Handler for the mapping-creation endpoint.

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Creates (or reuses) a short mapping for a URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Flow
///
/// 1. Guard: blocked check, global tier, create tier
/// 2. Suspicious-pattern scan of the submitted URL (counts abuse, never
///    rejects synchronously)
/// 3. Payload validation, then `create_mapping`
///
/// # Responses
///
/// - `201 Created` with the new mapping
/// - `200 OK` when an existing mapping was reused (`is_existing = true`)
/// - `400` on validation failure, `429` when rate limited or blocked
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let ip = client_ip(&headers, addr, state.behind_proxy);

    state.guard.check_request(&ip).await?;
    state.guard.check_create(&ip).await?;
    state.guard.scan_target(&ip, &payload.url).await;

    payload.validate()?;

    let (record, is_existing) = state
        .resolver
        .create_mapping(&payload.url, Some(ip), payload.expires_in)
        .await?;

    let status = if is_existing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(ShortenResponse::from_record(
            record,
            &state.base_url,
            is_existing,
        )),
    ))
}
