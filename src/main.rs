use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use face_verify_hw::app_state::AppState;
use face_verify_hw::config::AppConfig;
use face_verify_hw::routes;
use face_verify_hw::services::{face::DeepFaceClient, staging::ScratchDir};

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

    tracing::info!("Initializing face-verify-hw server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!(
        "face_verifications_total",
        "Verification requests by outcome"
    );
    metrics::describe_histogram!(
        "face_verification_seconds",
        "Time to handle a verification request"
    );
    metrics::describe_counter!("staged_images_total", "Uploads staged to the scratch directory");

    let scratch =
        ScratchDir::create(&config.scratch_dir).expect("Failed to create scratch directory");
    tracing::info!(path = %scratch.path().display(), "Scratch directory ready");

    tracing::info!(
        url = %config.deepface_url,
        shared_paths = config.deepface_shared_paths,
        "Using DeepFace service"
    );
    let comparer = DeepFaceClient::new(&config.deepface_url, config.deepface_shared_paths);

    let options = config.verify_options();
    tracing::info!(
        model = %options.model,
        detector_backend = %options.detector_backend,
        distance_metric = %options.distance_metric,
        enforce_detection = options.enforce_detection,
        "Verification options"
    );

    let state = AppState::new(comparer, scratch, options);
    let scratch = state.scratch.clone();

    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    scratch.remove();
    tracing::info!("face-verify-hw stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
