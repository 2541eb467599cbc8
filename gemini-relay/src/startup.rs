//! Application startup and lifecycle management.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use relay_core::error::AppError;
use relay_core::middleware::{http_trace_layer, metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::RelayConfig;
use crate::handlers;
use crate::services::GeminiClient;

/// Path the workflow platform posts prompts to.
pub const RELAY_PATH: &str = "/api/proxy";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub gemini: GeminiClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        let gemini = GeminiClient::new(&config.google);
        Self {
            config: Arc::new(config),
            gemini,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            RELAY_PATH,
            post(handlers::relay::relay_prompt)
                .fallback(handlers::relay::method_not_allowed)
                .layer(DefaultBodyLimit::max(handlers::relay::MAX_BODY_BYTES)),
        )
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Bind the listener (port 0 = random port for testing) and assemble the router.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        if config.auth_enabled() {
            tracing::info!("Shared-secret authentication enabled");
        } else {
            tracing::warn!("FEISHU_SECRET not set - relay endpoint accepts unauthenticated requests");
        }

        if config.has_api_key() {
            tracing::info!(model = %config.google.model, "Gemini client initialized");
        } else {
            tracing::warn!("GOOGLE_API_KEY not set - relay requests will fail until it is configured");
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config));

        tracing::info!("gemini-relay listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
