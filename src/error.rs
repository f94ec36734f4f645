//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! The first three variants carry the exact client-facing messages the
//! forwarding handler surfaces to callers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("API key(s) not configured. Please check server environment variables.")]
    KeysNotConfigured,

    #[error("All available API keys failed. Please check server logs and API key status.")]
    KeysExhausted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
