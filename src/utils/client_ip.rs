//! Client IP extraction.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP for rate limiting and analytics.
///
/// Uses the socket peer address unless `behind_proxy` is set, in which case
/// `X-Forwarded-For` (first hop) and `X-Real-IP` are trusted. Enable proxy
/// mode only behind a trusted reverse proxy; the headers are trivially
/// spoofable otherwise and would let clients rotate their own rate-limit
/// identity.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        if let Some(real_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}
