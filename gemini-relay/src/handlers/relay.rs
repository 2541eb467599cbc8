//! The relay endpoint: validates a workflow request, forwards the prompt to
//! Gemini and answers with the fixed JSON envelope.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    Json,
};
use relay_core::error::AppError;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::services::GeminiError;
use crate::startup::AppState;

/// Header carrying the shared secret.
pub const SECRET_TOKEN_HEADER: &str = "x-secret-token";

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub gemini_result: String,
}

/// Largest request body the relay buffers.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// `POST /api/proxy`
///
/// The body rejection is taken by value so an oversized or broken body is
/// reported after the auth gate, inside the JSON envelope.
pub async fn relay_prompt(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    let result = relay(&state, &headers, body).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    crate::services::metrics::record_relay_outcome(outcome);

    match &result {
        Ok(_) => tracing::info!(outcome, "Prompt relayed"),
        Err(e) => tracing::warn!(outcome, status = e.status().as_u16(), "Relay request failed"),
    }

    result.map(|gemini_result| {
        Json(RelayResponse {
            success: true,
            gemini_result,
        })
    })
}

/// Fallback for every method other than POST on the relay route.
pub async fn method_not_allowed() -> AppError {
    crate::services::metrics::record_relay_outcome(AppError::MethodNotAllowed.kind());
    AppError::MethodNotAllowed
}

async fn relay(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, AppError> {
    authorize(&state.config.auth, headers)?;

    let body = body
        .map_err(|rejection| AppError::InternalError(anyhow::anyhow!(rejection.body_text())))?;
    let prompt = extract_prompt(&body)?;

    let api_key = state.config.google.api_key.as_ref().ok_or_else(|| {
        AppError::ConfigError(anyhow::anyhow!(
            "Missing GOOGLE_API_KEY environment variable"
        ))
    })?;

    state
        .gemini
        .generate_content(api_key, &prompt)
        .await
        .map_err(map_gemini_error)
}

/// Compare `x-secret-token` with the configured secret. No secret configured means open access.
pub fn authorize(auth: &AuthConfig, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = auth.secret_token.as_ref() else {
        return Ok(());
    };

    let provided = headers
        .get(SECRET_TOKEN_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    if secrets_match(expected, provided) {
        Ok(())
    } else {
        tracing::warn!(
            header_present = headers.contains_key(SECRET_TOKEN_HEADER),
            "Rejected request with invalid secret token"
        );
        Err(AppError::Unauthorized)
    }
}

fn secrets_match(expected: &Secret<String>, provided: &[u8]) -> bool {
    let expected = expected.expose_secret().as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(provided).into()
}

/// Pull a non-empty `prompt` string out of the JSON body.
///
/// An empty body or a payload without a usable prompt is a client error; a
/// body that is not JSON at all is an internal fault.
pub fn extract_prompt(body: &[u8]) -> Result<String, AppError> {
    let missing = || AppError::BadRequest("Missing prompt in body".to_string());

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(missing());
    }

    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    payload
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|prompt| !prompt.is_empty())
        .map(str::to_string)
        .ok_or_else(missing)
}

fn map_gemini_error(err: GeminiError) -> AppError {
    match err {
        GeminiError::ApiError { status, body } => AppError::Upstream {
            status,
            error: "Google API Error".to_string(),
            details: body,
        },
        other => AppError::InternalError(anyhow::Error::new(other)),
    }
}
