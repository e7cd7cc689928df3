//! Collision-checked short code generation.

use std::sync::Arc;

use tracing::warn;

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// The 57-symbol code alphabet: Base62 minus the visually ambiguous
/// `0 O I l 1`.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Code length for normal generation.
pub const CODE_LENGTH: usize = 7;

/// Code length for the post-exhaustion fallback.
pub const FALLBACK_CODE_LENGTH: usize = 10;

/// Collision-checked attempts before falling back to the longer length.
pub const MAX_ATTEMPTS: usize = 5;

/// Generates short codes that are unique among *active* records.
///
/// Codes are random rather than sequential so they cannot be enumerated and
/// leak neither creation order nor traffic volume. Each candidate is checked
/// against the store; after `MAX_ATTEMPTS` collisions one candidate at
/// [`FALLBACK_CODE_LENGTH`] is returned without a check - at 57^10 the
/// residual collision probability is negligible, and the bounded retry caps
/// worst-case latency.
pub struct CodeGenerator {
    repository: Arc<dyn UrlRepository>,
}

impl CodeGenerator {
    pub fn new(repository: Arc<dyn UrlRepository>) -> Self {
        Self { repository }
    }

    /// Produces a candidate code not currently held by any active record.
    ///
    /// # Errors
    ///
    /// Propagates [`AppError::DependencyUnavailable`] from the collision
    /// lookups; the generator never silently returns a known-colliding code
    /// while attempts remain.
    pub async fn generate(&self) -> Result<String, AppError> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = random_code(CODE_LENGTH);

            if self
                .repository
                .find_active_by_code(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }

            metrics::counter!("code_collisions_total").increment(1);
        }

        // Exhausted the short keyspace attempts; take the longer code
        // unconditionally rather than retrying without bound.
        warn!(
            "Code generation exhausted {} attempts, falling back to length {}",
            MAX_ATTEMPTS, FALLBACK_CODE_LENGTH
        );
        Ok(random_code(FALLBACK_CODE_LENGTH))
    }
}

/// Draws `length` symbols uniformly from [`CODE_ALPHABET`] using OS entropy.
///
/// Bytes are rejection-sampled: 228 is the largest multiple of 57 below 256,
/// so accepting only bytes under it keeps the distribution unbiased.
pub fn random_code(length: usize) -> String {
    const LIMIT: u8 = (256 / CODE_ALPHABET.len() * CODE_ALPHABET.len()) as u8;

    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 32];

    while code.len() < length {
        getrandom::fill(&mut buffer).expect("OS random number generator failed");

        for &byte in &buffer {
            if byte < LIMIT {
                code.push(CODE_ALPHABET[(byte % CODE_ALPHABET.len() as u8) as usize] as char);
                if code.len() == length {
                    break;
                }
            }
        }
    }

    code
}
