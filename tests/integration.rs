use reqwest::Method;
use serde_json::json;
use storygate::{
    ai::{AttemptOutcome, GenerationService, MockGenerationClient},
    handler::ForwardHandler,
    models::{GenerateRequest, UserProfile},
};

fn envelope_json() -> &'static str {
    r#"{
        "currentHistory": [
            { "role": "user", "parts": [{ "text": "I walk into the ruined tower." }] },
            { "role": "model", "parts": [{ "text": "{\"story\":\"Dust swirls...\"}" }] },
            { "role": "user", "parts": [{ "text": "I light a torch." }] }
        ],
        "systemPrompt": "You are the narrator of an interactive story.",
        "responseSchema": {
            "type": "object",
            "properties": {
                "story": { "type": "string" },
                "choices": { "type": "array", "items": { "type": "string" } }
            }
        },
        "userProfile": { "name": "Rook", "gender": "male", "rating": "PG-13" }
    }"#
}

fn handler_with(mock: &MockGenerationClient, keys: &[&str]) -> ForwardHandler {
    ForwardHandler::with_service(
        Box::new(mock.clone()),
        keys.iter().map(|k| k.to_string()).collect(),
    )
}

#[tokio::test]
async fn test_full_envelope_forwards_and_returns_upstream_body() {
    let upstream_body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "{\"story\":\"The torch catches.\"}" }] }
        }],
        "usageMetadata": { "totalTokenCount": 120 }
    });

    let mock =
        MockGenerationClient::new().with_outcome(AttemptOutcome::Success(upstream_body.clone()));
    let handler = handler_with(&mock, &["key-alpha"]);

    let request: GenerateRequest = serde_json::from_str(envelope_json()).unwrap();
    let response = handler.handle(Method::POST, &request).await;

    // The upstream body is passed through without reshaping.
    assert_eq!(response.status, 200);
    assert_eq!(response.body, upstream_body);

    let calls = mock.recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request["contents"].as_array().unwrap().len(), 3);

    let system_text = calls[0].request["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(system_text.contains("Codename: Rook"));
    assert!(system_text.ends_with("You are the narrator of an interactive story."));
}

#[tokio::test]
async fn test_mixed_failures_then_success_uses_three_keys() {
    let mock = MockGenerationClient::new()
        .with_outcome(AttemptOutcome::UpstreamRejected {
            status: 429,
            body: "RESOURCE_EXHAUSTED".to_string(),
        })
        .with_outcome(AttemptOutcome::TransportError(
            "connection timed out".to_string(),
        ))
        .with_outcome(AttemptOutcome::Success(json!({ "story": "ok" })));
    let handler = handler_with(&mock, &["k1", "k2", "k3"]);

    let request: GenerateRequest = serde_json::from_str(envelope_json()).unwrap();
    let response = handler.handle(Method::POST, &request).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "story": "ok" }));

    let keys: Vec<String> = mock
        .recorded_calls()
        .iter()
        .map(|c| c.api_key.clone())
        .collect();
    assert_eq!(keys, vec!["k1", "k2", "k3"]);
}

#[tokio::test]
async fn test_exhausted_pool_reports_aggregate_failure() {
    let mock = MockGenerationClient::new()
        .with_outcome(AttemptOutcome::UpstreamRejected {
            status: 403,
            body: "PERMISSION_DENIED".to_string(),
        })
        .with_outcome(AttemptOutcome::UpstreamRejected {
            status: 400,
            body: "INVALID_ARGUMENT".to_string(),
        });
    let handler = handler_with(&mock, &["k1", "k2"]);

    let request: GenerateRequest = serde_json::from_str(envelope_json()).unwrap();
    let response = handler.handle(Method::POST, &request).await;

    assert_eq!(response.status, 500);
    assert_eq!(
        response.body["error"],
        "All available API keys failed. Please check server logs and API key status."
    );
    assert_eq!(mock.get_call_count(), 2);
}

#[tokio::test]
async fn test_rejected_methods_never_reach_the_service() {
    let mock = MockGenerationClient::new();
    let handler = handler_with(&mock, &["k1"]);
    let request: GenerateRequest = serde_json::from_str(envelope_json()).unwrap();

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = handler.handle(method, &request).await;
        assert_eq!(response.status, 405);
        assert_eq!(response.body["message"], "Method Not Allowed");
    }

    assert_eq!(mock.get_call_count(), 0);
}

#[tokio::test]
async fn test_profile_preamble_repeats_on_every_attempt() {
    let mock = MockGenerationClient::new()
        .with_outcome(AttemptOutcome::TransportError("reset by peer".to_string()))
        .with_outcome(AttemptOutcome::Success(json!({ "story": "ok" })));
    let handler = handler_with(&mock, &["k1", "k2"]);

    let request = GenerateRequest {
        current_history: vec![],
        system_prompt: "Narrate.".to_string(),
        response_schema: json!({ "type": "object" }),
        user_profile: Some(UserProfile {
            name: "Rook".to_string(),
            gender: "male".to_string(),
            rating: "PG-13".to_string(),
        }),
    };

    handler.handle(Method::POST, &request).await;

    let calls = mock.recorded_calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        let system_text = call.request["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(system_text.starts_with("[PLAYER PROFILE]"));
        assert!(system_text.ends_with("Narrate."));
    }
}

#[tokio::test]
async fn test_mock_service_is_usable_directly() {
    let mock = MockGenerationClient::new();
    let request: GenerateRequest = serde_json::from_str(envelope_json()).unwrap();

    let payload = storygate::ai::gemini::types::GenerateContentRequest {
        contents: request.current_history.clone(),
        generation_config:
            storygate::ai::gemini::types::GenerationConfig::structured_json(
                request.response_schema.clone(),
            ),
        system_instruction: storygate::ai::gemini::types::Content {
            role: None,
            parts: vec![storygate::ai::gemini::types::Part::Text {
                text: request.system_prompt.clone(),
            }],
        },
    };

    let outcome = mock.generate("key", &payload).await;
    assert!(matches!(outcome, AttemptOutcome::Success(_)));
    assert_eq!(mock.get_call_count(), 1);
}
