//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::Redirect,
};
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::entities::AccessEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Guard: blocked check + global tier
/// 2. Cache-aside resolve (cache hit skips the store entirely)
/// 3. Fire-and-forget access event via the bounded queue
/// 4. `307 Temporary Redirect`
///
/// The access event is dispatched with `try_send` after the resolution
/// result is determined; a full queue drops the event rather than delaying
/// the redirect.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let ip = client_ip(&headers, addr, state.behind_proxy);
    state.guard.check_request(&ip).await?;

    let record = state.resolver.resolve(&code).await?;

    let event = AccessEvent::new(
        record.id,
        Some(ip),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    if state.access_tx.try_send(event).is_err() {
        metrics::counter!("access_events_dropped_total").increment(1);
        debug!("Access queue full, dropping event for {}", code);
    }

    metrics::counter!("redirects_total").increment(1);
    Ok(Redirect::temporary(&record.original_url))
}
