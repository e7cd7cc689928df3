//! Distributed rate limiting and abuse tracking.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regex::RegexSet;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::cache_keys::{abuse_key, blocked_key, create_ratelimit_key, ratelimit_key};

/// Default suspicious-target patterns: executable payloads, obvious
/// malware/phishing markers, and other shortening services (the "double
/// shortening" block).
const DEFAULT_SUSPICIOUS_PATTERNS: &[&str] = &[
    r"(?i)\.(exe|scr|bat|cmd|pif|msi|jar|apk|dmg)([?#/]|$)",
    r"(?i)(phish|malware|trojan|keylogger|ransomware|credential)",
    r"(?i)^https?://(www\.)?(bit\.ly|tinyurl\.com|t\.co|goo\.gl|is\.gd|ow\.ly|buff\.ly|rb\.gy|cutt\.ly|shorturl\.at)(/|$)",
];

/// Tunable limits for the guard. Defaults match the documented windows.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Fixed-window length for both quota tiers, in seconds.
    pub window_seconds: u64,
    /// Requests per IP per window across all endpoints.
    pub global_limit: u64,
    /// Mapping creations per IP per window.
    pub create_limit: u64,
    /// Suspicious actions before a block is written.
    pub abuse_threshold: u64,
    /// Lifetime of the abuse counter, in seconds.
    pub abuse_window_seconds: u64,
    /// Block duration once the threshold is crossed, in seconds.
    pub block_seconds: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            window_seconds: 900,
            global_limit: 100,
            create_limit: 10,
            abuse_threshold: 50,
            abuse_window_seconds: 3_600,
            block_seconds: 3_600,
        }
    }
}

/// Multi-tier request quotas plus temporary IP blocking.
///
/// All state lives in the shared cache, so enforcement is consistent across
/// any number of stateless instances and there are no process-local
/// counters. When the cache is unreachable or disabled the guard fails open:
/// requests proceed unthrottled rather than failing closed.
///
/// Counters are fixed-window: the increment that creates a key sets its
/// expiry, later increments never extend it, and the only reset is TTL
/// expiry.
pub struct RateGuard {
    cache: Arc<dyn CacheService>,
    config: GuardConfig,
    suspicious: RegexSet,
}

impl RateGuard {
    /// Builds a guard with the default suspicious-pattern set.
    pub fn new(cache: Arc<dyn CacheService>, config: GuardConfig) -> Self {
        let suspicious = RegexSet::new(DEFAULT_SUSPICIOUS_PATTERNS)
            .expect("default suspicious patterns must compile");
        Self {
            cache,
            config,
            suspicious,
        }
    }

    /// Builds a guard with a custom pattern set.
    ///
    /// # Errors
    ///
    /// Returns the regex error if any pattern fails to compile.
    pub fn with_patterns(
        cache: Arc<dyn CacheService>,
        config: GuardConfig,
        patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            cache,
            config,
            suspicious: RegexSet::new(patterns)?,
        })
    }

    /// Per-request admission check: blocked marker first, then the global
    /// fixed-window tier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RateLimited`] carrying the stored `unblock_at`
    /// for blocked IPs, or a retry-later signal when the window is
    /// exhausted.
    pub async fn check_request(&self, ip: &str) -> Result<(), AppError> {
        self.check_blocked(ip).await?;
        self.check_tier(ip, &ratelimit_key(ip), self.config.global_limit)
            .await
    }

    /// Additional admission check for mapping-creation requests. Runs the
    /// create tier only; callers invoke [`Self::check_request`] first.
    ///
    /// The create quota is independent of the global tier: exhausting it
    /// leaves redirect reads unaffected.
    pub async fn check_create(&self, ip: &str) -> Result<(), AppError> {
        self.check_tier(ip, &create_ratelimit_key(ip), self.config.create_limit)
            .await
    }

    /// Scans a creation target against the suspicious-pattern set and bumps
    /// the abuse counter on a match. Crossing the threshold writes the block
    /// marker.
    ///
    /// The scan never rejects the current request synchronously; rejection
    /// happens via the blocked check on a later request. Cache failures are
    /// swallowed (fail-open).
    pub async fn scan_target(&self, ip: &str, target_url: &str) {
        if !self.suspicious.is_match(target_url) {
            return;
        }

        metrics::counter!("suspicious_targets_total").increment(1);
        debug!("Suspicious target URL from {}", ip);

        let count = match self
            .cache
            .incr_with_expire(&abuse_key(ip), self.config.abuse_window_seconds)
            .await
        {
            Ok(Some(count)) => count,
            Ok(None) => return,
            Err(e) => {
                warn!("Abuse counter unavailable for {}: {}", ip, e);
                return;
            }
        };

        if count > self.config.abuse_threshold {
            let unblock_at = Utc::now() + Duration::seconds(self.config.block_seconds as i64);
            let _ = self
                .cache
                .set_with_ttl(
                    &blocked_key(ip),
                    &unblock_at.to_rfc3339(),
                    self.config.block_seconds,
                )
                .await;
            metrics::counter!("ips_blocked_total").increment(1);
            warn!("Blocked {} until {} (abuse count {})", ip, unblock_at, count);
        }
    }

    async fn check_blocked(&self, ip: &str) -> Result<(), AppError> {
        let stored = match self.cache.get(&blocked_key(ip)).await {
            Ok(Some(value)) => value,
            // Miss, disabled cache, or backend failure: fail open.
            _ => return Ok(()),
        };

        let unblock_at = stored
            .parse::<DateTime<Utc>>()
            .map(|t| t.to_rfc3339())
            .unwrap_or(stored);

        metrics::counter!("requests_blocked_total").increment(1);
        Err(AppError::rate_limited(
            "IP temporarily blocked due to suspicious activity",
            json!({ "unblock_at": unblock_at }),
        ))
    }

    async fn check_tier(&self, ip: &str, key: &str, limit: u64) -> Result<(), AppError> {
        let count = match self
            .cache
            .incr_with_expire(key, self.config.window_seconds)
            .await
        {
            Ok(Some(count)) => count,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("Rate counter unavailable for {}: {}", ip, e);
                return Ok(());
            }
        };

        if count > limit {
            metrics::counter!("requests_rate_limited_total").increment(1);
            // Fixed windows set their expiry on first increment and the
            // remainder is not read back, so report the full window as a
            // conservative upper bound.
            return Err(AppError::rate_limited(
                "Rate limit exceeded, retry later",
                json!({
                    "limit": limit,
                    "window_seconds": self.config.window_seconds,
                    "retry_after_seconds": self.config.window_seconds,
                }),
            ));
        }

        Ok(())
    }
}
