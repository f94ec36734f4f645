use super::types::GenerateContentRequest;
use crate::ai::{AttemptOutcome, GenerationService};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini REST client for the `generateContent` endpoint.
///
/// Holds no API key of its own: the key is supplied per call so the failover
/// loop can rotate through the pool against one shared connection pool.
pub struct GeminiClient {
    client: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example
    /// `gemini-2.5-flash-preview-05-20`), not a `models/...`-prefixed path
    /// segment.
    pub fn new(model: String) -> Self {
        Self::new_with_client(model, Client::new())
    }

    pub fn new_with_client(model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, api_key: &str, request: &GenerateContentRequest) -> AttemptOutcome {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = match self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::TransportError(e.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::TransportError(e.to_string()),
        };

        if !status.is_success() {
            return AttemptOutcome::UpstreamRejected {
                status: status.as_u16(),
                body,
            };
        }

        match serde_json::from_str(&body) {
            Ok(json) => AttemptOutcome::Success(json),
            Err(e) => AttemptOutcome::TransportError(format!(
                "Failed to parse Gemini response: {}",
                e
            )),
        }
    }
}
