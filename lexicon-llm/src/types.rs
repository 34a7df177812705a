//! Core types for LLM requests, responses and the reply shapes we expect.

use serde::{Deserialize, Serialize};

use lexicon_core::types::one_or_many;

/// A request to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt (role and output rules). May be empty.
    pub system: String,
    /// User prompt (the actual instruction).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// Create a request with default sampling settings.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 8192,
            temperature: 0.9,
            timeout_ms: 30_000,
        }
    }

    /// Set the output token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// System and user prompt joined for providers with a single prompt field.
    #[must_use]
    pub fn combined_prompt(&self) -> String {
        if self.system.is_empty() {
            self.user.clone()
        } else {
            format!("{}\n\n{}", self.system, self.user)
        }
    }
}

/// A response from the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model was used.
    pub model: String,
}

/// One element of the word-batch reply array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordReply {
    pub word: String,
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub etymology: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub spelling_tip: String,
    /// May arrive as a bare string.
    #[serde(default, deserialize_with = "one_or_many")]
    pub examples: Vec<String>,
}

/// The etymology-riddle reply object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestReply {
    /// The "ancient tale".
    pub riddle: String,
    /// The word being described.
    pub answer: String,
}
