//! Leitor Server
//!
//! A small OCR service: accepts an image by URL or file upload, validates
//! it in memory, runs it through the configured text-extraction backend,
//! and returns the extracted text as JSON.

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leitor_server::config::Config;
use leitor_server::ocr::OcrService;
use leitor_server::routes;
use leitor_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leitor_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Leitor Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Configured OCR providers: {:?}",
        config.ocr.providers
    );

    // One HTTP client for the process: downloads and API-backed providers
    // share its connection pool.
    let http = reqwest::Client::new();

    let ocr = OcrService::new(config.ocr.clone(), http.clone());
    let available = ocr.available_providers().await;
    if available.is_empty() {
        tracing::warn!("No OCR provider is currently available; /ocr will return 503");
    } else {
        tracing::info!("Available OCR providers: {:?}", available);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, http, ocr);
    let app = routes::router(app_state);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    tracing::info!(
        "Leitor Server listening on {}",
        listener.local_addr().expect("listener has no local addr")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
