//! Configuration for Lexicon Luminary.
//!
//! Maps directly to `lexicon.toml`. Every section and field is optional;
//! missing values fall back to the defaults below.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Word generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Etymology quest tuning.
    #[serde(default)]
    pub quest: QuestConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Text-to-speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl LexiconConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `LexiconError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::LexiconError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// LLM integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "gemini", "openai", "ollama", "none".
    #[serde(default = "default_gemini")]
    pub provider: String,
    /// Base URL for the provider's API.
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Hard timeout for any LLM call in milliseconds.
    #[serde(default = "default_30000")]
    pub request_timeout_ms: u64,
    /// Retries after the first failed attempt.
    #[serde(default = "default_2")]
    pub max_retries: u32,
    /// Sampling temperature.
    #[serde(default = "default_0_9")]
    pub temperature: f32,
    /// Maximum output tokens per call.
    #[serde(default = "default_8192")]
    pub max_tokens: u32,
    /// Directory of TOML prompt overrides. Built-in templates when unset.
    #[serde(default)]
    pub prompt_dir: Option<PathBuf>,
}

impl LlmConfig {
    /// Whether the configured provider authenticates with an API key.
    #[must_use]
    pub fn requires_api_key(&self) -> bool {
        matches!(self.provider.as_str(), "gemini" | "openai")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_gemini(),
            base_url: default_gemini_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_ms: 30_000,
            max_retries: 2,
            temperature: 0.9,
            max_tokens: 8192,
            prompt_dir: None,
        }
    }
}

/// Word generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Words requested per "generate" action.
    #[serde(default = "default_10")]
    pub batch_size: usize,
    /// Theme used when none is given.
    #[serde(default = "default_theme")]
    pub default_theme: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            default_theme: default_theme(),
        }
    }
}

/// Etymology quest tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestConfig {
    /// Level a fresh game starts at.
    #[serde(default = "default_1")]
    pub starting_level: u32,
    /// Points per level awarded for a correct answer.
    #[serde(default = "default_10_u32")]
    pub points_per_level: u32,
    /// Theme assigned to words unlocked by a quest.
    #[serde(default = "default_theme")]
    pub unlock_theme: String,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            starting_level: 1,
            points_per_level: 10,
            unlock_theme: default_theme(),
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "sqlite" or "json".
    #[serde(default = "default_sqlite")]
    pub backend: String,
    /// Path of the database or JSON file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Key the word bank record is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Use WAL mode (sqlite only).
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: default_sqlite(),
            path: default_store_path(),
            storage_key: default_storage_key(),
            wal_mode: true,
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether pronunciation playback is attempted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Speaking rate multiplier (1.0 = engine default).
    #[serde(default = "default_0_8")]
    pub rate: f32,
    /// Pitch multiplier.
    #[serde(default = "default_1_0")]
    pub pitch: f32,
    /// Volume, 0.0 to 1.0.
    #[serde(default = "default_1_0")]
    pub volume: f32,
    /// Explicit TTS program. Auto-detected from `PATH` when unset.
    #[serde(default)]
    pub command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
            command: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_gemini() -> String { "gemini".to_string() }
fn default_gemini_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_theme() -> String { "Academic".to_string() }
fn default_sqlite() -> String { "sqlite".to_string() }
fn default_store_path() -> PathBuf { PathBuf::from("lexicon.db") }
fn default_storage_key() -> String { crate::persistence::DEFAULT_STORAGE_KEY.to_string() }
fn default_0_8() -> f32 { 0.8 }
fn default_0_9() -> f32 { 0.9 }
fn default_1_0() -> f32 { 1.0 }
fn default_1() -> u32 { 1 }
fn default_2() -> u32 { 2 }
fn default_10() -> usize { 10 }
fn default_10_u32() -> u32 { 10 }
fn default_8192() -> u32 { 8192 }
fn default_30000() -> u64 { 30_000 }
