//! Forwarding handler: validates an inbound generation request, builds the
//! upstream payload, and relays it to Gemini with ordered API-key failover.

use crate::ai::gemini::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::ai::{AttemptOutcome, GeminiClient, GenerationService};
use crate::models::{ApiResponse, Config, GenerateRequest};
use crate::{prompts, Error, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info, warn};

/// Relays one story-generation request to the upstream generation service,
/// trying each configured API key in order until one succeeds.
pub struct ForwardHandler {
    service: Box<dyn GenerationService>,
    api_keys: Vec<String>,
}

impl ForwardHandler {
    /// Build a handler from environment configuration, talking to the real
    /// Gemini API over a fresh connection pool.
    pub fn new(config: &Config) -> Self {
        Self::with_service(
            Box::new(GeminiClient::new(config.model.clone())),
            config.api_keys.clone(),
        )
    }

    /// Build a handler from an injected service and key pool.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_service(service: Box<dyn GenerationService>, api_keys: Vec<String>) -> Self {
        Self { service, api_keys }
    }

    /// Handle one inbound request, mapping every outcome to the response the
    /// hosting runtime should return.
    pub async fn handle(&self, method: Method, request: &GenerateRequest) -> ApiResponse {
        match self.forward(method, request).await {
            Ok(body) => ApiResponse::ok(body),
            Err(e) => ApiResponse::from_error(&e),
        }
    }

    async fn forward(&self, method: Method, request: &GenerateRequest) -> Result<Value> {
        if method != Method::POST {
            return Err(Error::MethodNotAllowed);
        }

        if self.api_keys.is_empty() {
            error!("No Gemini API keys configured; rejecting request");
            return Err(Error::KeysNotConfigured);
        }

        // Built once; every key attempt sends the identical payload.
        let system_text =
            prompts::effective_system_prompt(request.user_profile.as_ref(), &request.system_prompt);

        let payload = GenerateContentRequest {
            contents: request.current_history.clone(),
            generation_config: GenerationConfig::structured_json(request.response_schema.clone()),
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text { text: system_text }],
            },
        };

        self.try_keys_in_order(&payload).await
    }

    /// One attempt per key, in pool order, stopping at the first success.
    /// Any non-2xx status and any transport failure advance to the next key.
    async fn try_keys_in_order(&self, payload: &GenerateContentRequest) -> Result<Value> {
        let total = self.api_keys.len();

        for (attempt, api_key) in self.api_keys.iter().enumerate() {
            match self.service.generate(api_key, payload).await {
                AttemptOutcome::Success(body) => {
                    info!(
                        "Generation succeeded with key ..{} (attempt {}/{})",
                        key_suffix(api_key),
                        attempt + 1,
                        total
                    );
                    return Ok(body);
                }
                AttemptOutcome::UpstreamRejected { status, body } => {
                    warn!(
                        "Key ..{} rejected upstream (status {}): {} (attempt {}/{})",
                        key_suffix(api_key),
                        status,
                        body,
                        attempt + 1,
                        total
                    );
                }
                AttemptOutcome::TransportError(reason) => {
                    warn!(
                        "Key ..{} failed in transport: {} (attempt {}/{})",
                        key_suffix(api_key),
                        reason,
                        attempt + 1,
                        total
                    );
                }
            }
        }

        error!("All {} Gemini API keys failed", total);
        Err(Error::KeysExhausted)
    }
}

/// Last four characters of a key, for diagnostics. Never log full keys.
fn key_suffix(key: &str) -> &str {
    let start = key
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &key[start..]
}
