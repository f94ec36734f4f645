//! Upstream generation service integration
//!
//! Provides the interface to Gemini's `generateContent` API used to produce
//! story continuations, plus a scripted mock for tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockGenerationClient;

use crate::ai::gemini::types::GenerateContentRequest;
use async_trait::async_trait;
use serde_json::Value;

/// Result of one upstream call with one API key.
///
/// Both rejection variants are non-fatal to the invocation: the failover
/// loop advances to the next key on either.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// 2xx response; carries the raw upstream JSON body.
    Success(Value),
    /// Upstream answered with a non-2xx status.
    UpstreamRejected { status: u16, body: String },
    /// The call never produced an upstream response (connect, timeout, DNS),
    /// or the response body was unreadable.
    TransportError(String),
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, api_key: &str, request: &GenerateContentRequest) -> AttemptOutcome;
}
