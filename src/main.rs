mod app_state;
mod config;
mod models;
mod routes;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{gateway::ColorizeClient, storage::ImageStore, tracker::JobTracker};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing sar-colorize-hw server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("colorize_jobs_total", "Total colorization jobs submitted");
    metrics::describe_counter!(
        "colorize_jobs_completed",
        "Total colorization jobs completed"
    );
    metrics::describe_counter!("colorize_jobs_failed", "Total colorization jobs that failed");
    metrics::describe_histogram!(
        "colorize_processing_seconds",
        "Time from submission to a terminal state"
    );
    metrics::describe_gauge!(
        "colorize_jobs_in_flight",
        "Jobs currently being processed by the model server"
    );

    // Initialize the processed-image store
    tracing::info!(dir = %config.processed_dir, "Initializing image store");
    let storage = Arc::new(
        ImageStore::init(&config.processed_dir)
            .await
            .expect("Failed to initialize image store"),
    );

    // Initialize the model server client
    tracing::info!(
        url = %config.model_server_url,
        protocol = ?config.model_protocol,
        "Initializing model server client"
    );
    let gateway = Arc::new(
        ColorizeClient::new(
            &config.model_server_url,
            config.model_protocol,
            Duration::from_secs(config.model_request_timeout_secs),
        )
        .expect("Failed to initialize model server client"),
    );

    // Initialize the job tracker
    let tracker = Arc::new(JobTracker::new(
        Arc::clone(&storage),
        gateway.clone(),
        chrono::Duration::seconds(config.job_timeout_secs as i64),
    ));

    // Create shared application state
    let state = AppState::new(tracker, gateway, storage);

    // Build API routes
    let app = routes::api_router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting sar-colorize-hw on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
