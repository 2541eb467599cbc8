//! HTTP handlers for gemini-relay.

pub mod relay;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use relay_core::observability::render_metrics;
use serde_json::json;

use crate::startup::AppState;

/// Liveness check.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "gemini-relay",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check. Not ready while the Gemini credential is missing.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.config.has_api_key() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": "GOOGLE_API_KEY not configured"
            })),
        )
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        render_metrics(),
    )
}
