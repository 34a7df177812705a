//! Generation error types.

use thiserror::Error;

/// Errors that can occur while asking the model for words or riddles.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// The reply was not valid JSON, even after stripping code fences.
    #[error("Failed to parse LLM response as JSON: {0}")]
    ParseError(String),

    /// The reply parsed but did not have the fields a word or quest needs.
    #[error("LLM output schema validation failed: {0}")]
    SchemaValidation(String),

    /// Request timed out.
    #[error("LLM request timed out after {0}ms")]
    Timeout(u64),

    /// LLM provider is unavailable.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("All LLM retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: String,
    },

    /// The caller asked for something that cannot be generated.
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout(0)
        } else if err.is_connect() {
            GenerationError::Unavailable(err.to_string())
        } else {
            GenerationError::RequestFailed(err.to_string())
        }
    }
}
