pub mod health;
pub mod metrics;
pub mod verify;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// Application routes, without the Prometheus endpoint or middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/verify/", post(verify::verify_faces))
        .route("/verify", post(verify::verify_faces))
        .with_state(state)
}
