//! Data models and structures
//!
//! Defines the inbound request envelope, the handler's response shape, and
//! process configuration sourced from the environment.

use crate::ai::gemini::types::Content;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Inbound story-generation request as produced by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Conversation so far, already shaped as Gemini role/parts turns.
    pub current_history: Vec<Content>,
    pub system_prompt: String,
    /// JSON schema describing the structured output the frontend expects.
    pub response_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

/// Player identity supplied by the frontend. All fields are optional on the
/// wire; absent fields deserialize to empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub rating: String,
}

/// Framework-agnostic response handed back to the hosting runtime.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn from_error(error: &crate::Error) -> Self {
        match error {
            crate::Error::MethodNotAllowed => Self {
                status: 405,
                body: json!({ "message": error.to_string() }),
            },
            _ => Self {
                status: 500,
                body: json!({ "error": error.to_string() }),
            },
        }
    }
}

/// Environment slots checked for API keys, in failover order. Missing or
/// empty slots are skipped; the remaining keys keep this order.
const KEY_SLOTS: [&str; 5] = [
    "GEMINI_API_KEY",
    "GEMINI_API_KEY_2",
    "GEMINI_API_KEY_3",
    "GEMINI_API_KEY_4",
    "GEMINI_API_KEY_5",
];

const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_keys: Vec<String>,
    pub model: String,
}

impl Config {
    /// Read configuration from the process environment. An empty key pool is
    /// not an error here; the handler reports it per-invocation.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_keys = KEY_SLOTS
            .iter()
            .filter_map(|slot| std::env::var(slot).ok())
            .filter(|key| !key.is_empty())
            .collect();

        Self {
            api_keys,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}
