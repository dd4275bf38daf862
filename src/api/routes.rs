//! HTTP API route definitions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health, metrics_text, predict, AppState};
use crate::store::PredictionStore;

/// Cross-origin policy: any origin, method and header, with credentials.
///
/// A wildcard cannot be combined with credentials, so the request's own
/// origin, method and headers are mirrored back.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Create the API router.
pub fn create_router<S: PredictionStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text::<S>))
        .route("/predict", post(predict::<S>))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
