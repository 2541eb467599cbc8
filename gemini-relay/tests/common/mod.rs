#![allow(dead_code)]

use gemini_relay::config::{AuthConfig, GoogleConfig, RelayConfig};
use gemini_relay::Application;
use relay_core::config::Config as CoreConfig;
use relay_core::observability::init_metrics;
use secrecy::Secret;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_MODEL: &str = "gemini-test";
pub const TEST_API_KEY: &str = "test-api-key";

/// Path the mocked Gemini endpoint is served on.
pub fn generate_content_path() -> String {
    format!("/v1beta/models/{}:generateContent", TEST_MODEL)
}

/// A minimal successful Gemini reply carrying `text`.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 4, "candidatesTokenCount": 1 }
    })
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub gemini: MockServer,
    pub client: reqwest::Client,
}

pub struct TestAppOptions {
    pub secret: Option<&'static str>,
    pub api_key: Option<&'static str>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            secret: None,
            api_key: Some(TEST_API_KEY),
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestAppOptions::default()).await
    }

    pub async fn spawn_with(options: TestAppOptions) -> Self {
        // The recorder is process-wide; later calls are no-ops.
        init_metrics().expect("Failed to install metrics recorder");

        let gemini = MockServer::start().await;

        // Use random port for testing (port 0)
        let config = RelayConfig {
            common: CoreConfig { port: 0 },
            auth: AuthConfig {
                secret_token: options.secret.map(|s| Secret::new(s.to_string())),
            },
            google: GoogleConfig {
                api_key: options.api_key.map(|k| Secret::new(k.to_string())),
                api_base: format!("{}/v1beta", gemini.uri()),
                model: TEST_MODEL.to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            gemini,
            client,
        }
    }

    pub fn relay_url(&self) -> String {
        format!("{}/api/proxy", self.address)
    }

    /// Fetch the Prometheus text served on `/metrics`.
    pub async fn metrics_text(&self) -> String {
        self.client
            .get(format!("{}/metrics", self.address))
            .send()
            .await
            .expect("Failed to execute request")
            .text()
            .await
            .expect("Failed to read metrics body")
    }

    /// POST a JSON body to the relay endpoint, optionally with a secret token.
    pub async fn post_prompt(&self, body: &Value, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.post(self.relay_url()).json(body);
        if let Some(token) = token {
            request = request.header("x-secret-token", token);
        }
        request.send().await.expect("Failed to execute request")
    }
}
