//! Shared utilities.

pub mod cache_keys;
pub mod client_ip;
pub mod url_normalizer;
