//! tabclean API Server implementation
//!
//! HTTP server using Axum. Browsers and scripts upload CSV / Excel files as
//! multipart forms and get back previews, cleaning reports and converted files.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::core::DEFAULT_PREVIEW_ROWS;

/// Default upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Rows included in previews
    pub preview_rows: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl ApiConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub version: String,
    pub preview_rows: usize,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            preview_rows: config.preview_rows,
        }
    }
}

/// Build the application router (used by the server and by tests)
pub fn build_router(config: &ApiConfig) -> Router {
    let state = Arc::new(AppState::new(config));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Upload endpoints
        .route("/api/v1/preview", post(handlers::preview))
        .route("/api/v1/process", post(handlers::process))
        .route("/api/v1/convert", post(handlers::convert))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabclean=info,tabclean_server=info,tower_http=info".into()),
        )
        .init();

    let app = build_router(&config);
    let addr = config.socket_addr()?;

    info!("🧹 tabclean API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/preview, /api/v1/process, /api/v1/convert");
    info!(
        "   Upload limit: {} bytes, preview rows: {}",
        config.max_upload_bytes, config.preview_rows
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tabclean API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, stopping server...");
}
