//! Router assembly.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    delete_handler, health_handler, redirect_handler, shorten_handler, stats_handler,
};
use crate::state::AppState;

/// Builds the application router.
///
/// The redirect route sits at the root so short URLs stay as short as the
/// codes themselves; management endpoints live under `/api`.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links/{code}", delete(delete_handler))
        .route("/stats/{code}", get(stats_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
