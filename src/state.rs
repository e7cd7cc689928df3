//! Shared application state.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{RateGuard, ResolverService, StatsService};
use crate::domain::entities::AccessEvent;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheService;

/// State handed to every handler through the router.
///
/// Everything here is either an `Arc` or a channel sender, so cloning per
/// request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverService>,
    pub guard: Arc<RateGuard>,
    pub stats: Arc<StatsService>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
    /// Producer side of the fire-and-forget analytics queue.
    pub access_tx: mpsc::Sender<AccessEvent>,
    /// Public base used to assemble short URLs in responses.
    pub base_url: String,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when resolving client IPs.
    pub behind_proxy: bool,
}
