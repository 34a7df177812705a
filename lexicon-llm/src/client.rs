//! LLM client: one interface for Gemini, OpenAI-compatible and Ollama backends.

use std::time::{Duration, Instant};

use lexicon_core::config::LlmConfig;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::types::{LlmRequest, LlmResponse};

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini { base_url: String, api_key: String },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible { base_url: String, api_key: String },
    /// Ollama running locally.
    Ollama { base_url: String },
    /// No LLM available; every call fails with `Unavailable`.
    None,
}

/// Pulls the generated text and token count out of a provider's JSON reply.
type Extract = fn(&Value) -> (Option<&str>, u64);

/// The main LLM client that routes requests to the configured backend.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no LLM backend.
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Build a client from configuration.
    ///
    /// `api_key` is required for `gemini` and `openai`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown provider or a missing key.
    pub fn from_config(config: &LlmConfig, api_key: Option<String>) -> Result<Self, GenerationError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let need_key = |provider: &str| {
            api_key.clone().ok_or_else(|| {
                GenerationError::ConfigError(format!(
                    "provider '{provider}' needs an API key in ${}",
                    config.api_key_env
                ))
            })
        };

        let provider = match config.provider.as_str() {
            "gemini" => LlmProvider::Gemini {
                base_url,
                api_key: need_key("gemini")?,
            },
            "openai" => LlmProvider::OpenAiCompatible {
                base_url,
                api_key: need_key("openai")?,
            },
            "ollama" => LlmProvider::Ollama { base_url },
            "none" => LlmProvider::None,
            other => {
                return Err(GenerationError::ConfigError(format!(
                    "unknown LLM provider '{other}'"
                )));
            }
        };

        Ok(Self::new(provider, config.model.clone(), config.max_retries))
    }

    /// Model name requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a response from the LLM.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` with no provider, or `RetriesExhausted` once
    /// every attempt has failed.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        match &self.provider {
            LlmProvider::None => Err(GenerationError::Unavailable(
                "No LLM provider configured".into(),
            )),
            LlmProvider::Gemini { base_url, api_key } => {
                let url = format!("{base_url}/v1beta/models/{}:generateContent", self.model);
                let mut body = json!({
                    "contents": [{ "role": "user", "parts": [{ "text": request.user }] }],
                    "generationConfig": {
                        "temperature": request.temperature,
                        "maxOutputTokens": request.max_tokens,
                    }
                });
                if !request.system.is_empty() {
                    body["systemInstruction"] = json!({ "parts": [{ "text": request.system }] });
                }
                self.post_with_retries(
                    "Gemini",
                    &url,
                    &[("x-goog-api-key", api_key.clone())],
                    &body,
                    request.timeout_ms,
                    |json| {
                        (
                            json["candidates"][0]["content"]["parts"][0]["text"].as_str(),
                            json["usageMetadata"]["candidatesTokenCount"]
                                .as_u64()
                                .unwrap_or(0),
                        )
                    },
                )
                .await
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                let url = format!("{base_url}/v1/chat/completions");
                let mut messages = Vec::new();
                if !request.system.is_empty() {
                    messages.push(json!({ "role": "system", "content": request.system }));
                }
                messages.push(json!({ "role": "user", "content": request.user }));
                let body = json!({
                    "model": self.model,
                    "messages": messages,
                    "max_tokens": request.max_tokens,
                    "temperature": request.temperature,
                });
                self.post_with_retries(
                    "OpenAI",
                    &url,
                    &[("Authorization", format!("Bearer {api_key}"))],
                    &body,
                    request.timeout_ms,
                    |json| {
                        (
                            json["choices"][0]["message"]["content"].as_str(),
                            json["usage"]["completion_tokens"].as_u64().unwrap_or(0),
                        )
                    },
                )
                .await
            }
            LlmProvider::Ollama { base_url } => {
                let url = format!("{base_url}/api/generate");
                let body = json!({
                    "model": self.model,
                    "prompt": request.combined_prompt(),
                    "stream": false,
                    "options": {
                        "temperature": request.temperature,
                        "num_predict": request.max_tokens,
                    }
                });
                self.post_with_retries(
                    "Ollama",
                    &url,
                    &[],
                    &body,
                    request.timeout_ms,
                    |json| {
                        (
                            json["response"].as_str(),
                            json["eval_count"].as_u64().unwrap_or(0),
                        )
                    },
                )
                .await
            }
        }
    }

    /// POST `body` to `url`, retrying transport and HTTP failures.
    async fn post_with_retries(
        &self,
        backend: &str,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
        timeout_ms: u64,
        extract: Extract,
    ) -> Result<LlmResponse, GenerationError> {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(
                    backend,
                    "Retrying LLM call (attempt {}/{})",
                    attempt + 1,
                    self.max_retries + 1
                );
            }

            let start = Instant::now();
            let mut builder = self
                .http
                .post(url)
                .json(body)
                .timeout(Duration::from_millis(timeout_ms));
            for (name, value) in headers {
                builder = builder.header(*name, value);
            }
            let result = builder.send().await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: Value = resp
                        .json()
                        .await
                        .map_err(|e| GenerationError::ParseError(e.to_string()))?;

                    let (text, tokens) = extract(&json);
                    let Some(text) = text else {
                        return Err(GenerationError::SchemaValidation(format!(
                            "{backend} reply carried no text"
                        )));
                    };

                    debug!(backend, model = %self.model, latency_ms, tokens, "LLM call succeeded");
                    return Ok(LlmResponse {
                        text: text.to_string(),
                        tokens_generated: u32::try_from(tokens).unwrap_or(u32::MAX),
                        latency_ms,
                        model: self.model.clone(),
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_error = format!("HTTP {status}: {}", resp.text().await.unwrap_or_default());
                    warn!(backend, "LLM backend returned error: {}", last_error);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() {
                        warn!(backend, "LLM request timed out after {}ms", timeout_ms);
                    } else {
                        warn!(backend, "LLM request failed: {}", last_error);
                    }
                }
            }
        }

        Err(GenerationError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }
}
