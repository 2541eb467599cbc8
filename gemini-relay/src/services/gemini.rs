//! Gemini `generateContent` client.
//!
//! Sends a single text prompt and pulls the first candidate's text out of the
//! reply. Every step returns a typed [`GeminiError`] so the handler can map
//! failures precisely.

use crate::config::GoogleConfig;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Error type for Gemini calls.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx reply; `body` is the raw response text.
    #[error("Gemini API error {status}: {body}")]
    ApiError { status: StatusCode, body: String },

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    #[error("Response is missing {0}")]
    MissingField(&'static str),
}

/// Gemini client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Build the API URL for the configured model. The key is added as a query parameter.
    fn api_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, self.model, method)
    }

    /// Generate a completion for `prompt` and return the first candidate's text.
    pub async fn generate_content(
        &self,
        api_key: &Secret<String>,
        prompt: &str,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(self.api_url("generateContent"))
            .query(&[("key", api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.without_url().to_string()));

        metrics::histogram!("relay_upstream_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        let response = response?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::NetworkError(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body_len = body.len(),
                "Gemini API returned an error"
            );
            return Err(GeminiError::ApiError { status, body });
        }

        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &api_response.usage_metadata {
            tracing::debug!(
                input_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }

        api_response.into_first_text()
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Only text parts are relevant here; other part kinds decode with `text: None`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i64>,
    pub candidates_token_count: Option<i64>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, or the first level that is absent.
    pub fn into_first_text(self) -> Result<String, GeminiError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GeminiError::MissingField("candidates[0]"))?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            tracing::debug!(finish_reason = %reason, "Gemini candidate finished");
        }

        let content = candidate
            .content
            .ok_or(GeminiError::MissingField("candidates[0].content"))?;

        let part = content
            .parts
            .into_iter()
            .next()
            .ok_or(GeminiError::MissingField("candidates[0].content.parts[0]"))?;

        part.text
            .ok_or(GeminiError::MissingField("candidates[0].content.parts[0].text"))
    }
}
