//! Page server route definitions.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{about, health, home, instance, not_found, prometheus_metrics, AppState};

/// Create the page server router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(home))
        .route("/instances/:id", get(instance))
        .route("/about", get(about))
        // Health and metrics endpoints
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
