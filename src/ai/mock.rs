use super::{AttemptOutcome, GenerationService};
use crate::ai::gemini::types::GenerateContentRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One recorded upstream attempt: which key was used and the payload as it
/// would appear on the wire.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub request: Value,
}

/// Scripted stand-in for [`GeminiClient`](super::GeminiClient).
///
/// Outcomes queued with [`with_outcome`](Self::with_outcome) are consumed in
/// order, one per call; once the queue is empty every further call succeeds
/// with a canned candidates body. Clones share state, so tests can keep a
/// probe handle after boxing the mock.
#[derive(Clone)]
pub struct MockGenerationClient {
    outcomes: Arc<Mutex<VecDeque<AttemptOutcome>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(self, outcome: AttemptOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn default_success() -> AttemptOutcome {
        AttemptOutcome::Success(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"story\":\"mock\"}" }] }
            }]
        }))
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, api_key: &str, request: &GenerateContentRequest) -> AttemptOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            request: serde_json::to_value(request).expect("serialize mock request"),
        });

        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::default_success)
    }
}
