//! Background worker persisting access events off the request path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::entities::AccessEvent;
use crate::domain::repositories::UrlRepository;

/// Drains the access-event queue and persists each event.
///
/// Failures are logged and dropped - no retry, no backpressure onto the
/// redirect path. At-most-once delivery is the documented contract; events
/// still queued at shutdown are lost.
pub async fn run_access_worker(
    mut rx: mpsc::Receiver<AccessEvent>,
    repository: Arc<dyn UrlRepository>,
) {
    while let Some(event) = rx.recv().await {
        let url_id = event.url_id;
        match repository.insert_access_event(event).await {
            Ok(()) => {
                debug!("Recorded access for url_id={}", url_id);
            }
            Err(e) => {
                metrics::counter!("access_events_failed_total").increment(1);
                warn!("Dropping access event for url_id={}: {}", url_id, e);
            }
        }
    }

    debug!("Access worker channel closed, exiting");
}
