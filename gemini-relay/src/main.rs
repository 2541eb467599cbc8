use gemini_relay::{Application, RelayConfig};
use relay_core::observability::{init_metrics, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // OTLP export is opt-in: only when an endpoint is configured.
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("gemini-relay", "info", otlp_endpoint.as_deref());

    if let Err(e) = init_metrics() {
        tracing::warn!("Metrics disabled: {}", e);
    }

    let config = RelayConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let result = application.run_until_stopped().await;

    shutdown_tracing();
    result
}
