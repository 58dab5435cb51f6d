pub mod colorize;
pub mod error;
pub mod health;
pub mod metrics;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// Build the application route tree.
///
/// ```text
/// /health                   dependency health check
/// /api/upload               submit an image for colorization (POST)
/// /api/status/{job_id}      poll job state
/// /api/processed/{job_id}   download the colorized result
/// ```
///
/// The `/metrics` scrape endpoint and the middleware stack are attached in
/// `main` because they carry their own state.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/upload", post(colorize::upload_image))
        .route("/api/status/{job_id}", get(colorize::get_status))
        .route("/api/processed/{job_id}", get(colorize::get_processed_image))
        .with_state(state)
}
