//! # lexicon-llm: Generation Layer for Lexicon Luminary
//!
//! Everything that asks a language model for content goes through this crate:
//!   - **Word batches**: themed vocabulary entries, steered away from words
//!     the learner has already seen
//!   - **Word entries**: one full entry for a known headword (quest rewards)
//!   - **Etymology quests**: riddles whose answer is a single word
//!
//! Backends: Google Gemini (default), any OpenAI-compatible endpoint, and
//! Ollama. Every call carries a timeout and bounded retries, and replies are
//! decoded tolerantly (code fences and stray prose are stripped).
//!
//! # Flow
//!
//! ```text
//! PromptEngine ──render──▶ LlmRequest ──LlmClient──▶ raw text
//!                                                      │
//!                                   parse::decode_reply ▼
//!                               Vec<Word> / EtymologyQuest
//! ```
//!
//! Pronunciation playback ([`speech`]) also lives here, as the other
//! outbound integration.

pub mod client;
pub mod error;
pub mod generation;
pub mod parse;
pub mod prompt;
pub mod speech;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::GenerationError;
pub use generation::{GenerationClient, WordGenerator};
pub use prompt::{PromptEngine, PromptId};
pub use speech::Speaker;
pub use types::{LlmRequest, LlmResponse};
