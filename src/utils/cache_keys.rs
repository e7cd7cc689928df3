//! Cache key namespace.
//!
//! These formats are shared state between every server instance (and with
//! external tooling), so they must stay bit-exact.

/// Mapping cache entry for a short code.
pub fn short_key(code: &str) -> String {
    format!("short:{}", code)
}

/// Mapping cache entry for a normalized original URL.
pub fn url_key(original_url: &str) -> String {
    format!("url:{}", original_url)
}

/// Global-tier fixed-window counter for an IP.
pub fn ratelimit_key(ip: &str) -> String {
    format!("ratelimit:{}", ip)
}

/// Create-tier fixed-window counter for an IP.
pub fn create_ratelimit_key(ip: &str) -> String {
    format!("ratelimit:create:{}", ip)
}

/// Suspicious-action counter for an IP.
pub fn abuse_key(ip: &str) -> String {
    format!("abuse:{}", ip)
}

/// Block marker for an IP; the value is the unblock timestamp.
pub fn blocked_key(ip: &str) -> String {
    format!("blocked:{}", ip)
}
