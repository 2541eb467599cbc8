use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON envelope returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    /// A dependency answered with a failure status that is passed through verbatim.
    #[error("{error} ({status}): {details}")]
    Upstream {
        status: StatusCode,
        error: String,
        details: String,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::Unauthorized => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::ConfigError(_) => "misconfigured",
            AppError::Upstream { .. } => "upstream_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { status, .. } => *status,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, details) = match self {
            AppError::MethodNotAllowed => ("Method Not Allowed".to_string(), None),
            AppError::Unauthorized => ("Unauthorized".to_string(), None),
            AppError::BadRequest(msg) => (msg, None),
            // Operator-facing: the message itself names what is missing.
            AppError::ConfigError(err) => (err.to_string(), None),
            AppError::Upstream { error, details, .. } => (error, Some(details)),
            AppError::InternalError(err) => {
                tracing::error!(error = %format!("{:#}", err), "Internal server error");
                ("Internal Server Error".to_string(), Some(err.to_string()))
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_has_generic_body() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn config_error_omits_details() {
        let (status, body) = render(AppError::ConfigError(anyhow::anyhow!(
            "Missing GOOGLE_API_KEY environment variable"
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Missing GOOGLE_API_KEY environment variable" })
        );
    }

    #[tokio::test]
    async fn upstream_error_keeps_status() {
        let (status, body) = render(AppError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            error: "Google API Error".to_string(),
            details: "slow down".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Google API Error");
        assert_eq!(body["details"], "slow down");
    }

    #[tokio::test]
    async fn internal_error_carries_message() {
        let (status, body) = render(AppError::InternalError(anyhow::anyhow!("boom"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["details"], "boom");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AppError::MethodNotAllowed.kind(), "method_not_allowed");
        assert_eq!(AppError::BadRequest("x".into()).kind(), "bad_request");
    }
}
