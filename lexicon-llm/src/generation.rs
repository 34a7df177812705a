//! Word and riddle generation on top of [`LlmClient`].
//!
//! [`WordGenerator`] is the seam the session talks to; [`GenerationClient`]
//! is the network-backed implementation. Reply decoding lives in the free
//! functions [`words_from_reply`] and [`quest_from_reply`] so it can be
//! exercised without a model.

use std::future::Future;

use lexicon_core::config::LlmConfig;
use lexicon_core::quest::{Difficulty, EtymologyQuest};
use lexicon_core::types::{Theme, Word, WordId};
use tracing::{debug, info, warn};

use crate::client::LlmClient;
use crate::error::GenerationError;
use crate::parse::{Shape, decode_reply};
use crate::prompt::{PromptEngine, PromptId, exclude_clause};
use crate::types::{LlmRequest, QuestReply, WordReply};

/// Source of new words and riddles.
pub trait WordGenerator {
    /// Generate `count` new words for `theme`, avoiding `exclude`.
    fn generate_word_batch(
        &self,
        theme: &Theme,
        count: usize,
        exclude: &[String],
    ) -> impl Future<Output = Result<Vec<Word>, GenerationError>> + Send;

    /// Generate a full entry for a given `headword`.
    fn generate_word_entry(
        &self,
        headword: &str,
        theme: &Theme,
    ) -> impl Future<Output = Result<Word, GenerationError>> + Send;

    /// Generate an etymology riddle for `level`, avoiding `exclude`.
    fn generate_etymology_quest(
        &self,
        level: u32,
        exclude: &[String],
    ) -> impl Future<Output = Result<EtymologyQuest, GenerationError>> + Send;
}

/// Turn a word-batch reply into words carrying fresh ids and `theme`.
///
/// # Errors
///
/// `ParseError` if the reply is not a JSON array of word objects;
/// `SchemaValidation` if an entry has a blank headword or no examples.
pub fn words_from_reply(text: &str, theme: &Theme) -> Result<Vec<Word>, GenerationError> {
    let replies: Vec<WordReply> = decode_reply(text, Shape::Array)?;
    replies
        .into_iter()
        .enumerate()
        .map(|(index, reply)| word_from_reply(reply, theme, index))
        .collect()
}

fn word_from_reply(reply: WordReply, theme: &Theme, index: usize) -> Result<Word, GenerationError> {
    let headword = reply.word.trim();
    if headword.is_empty() {
        return Err(GenerationError::SchemaValidation(format!(
            "entry {index} has no headword"
        )));
    }
    let examples: Vec<String> = reply
        .examples
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if examples.is_empty() {
        return Err(GenerationError::SchemaValidation(format!(
            "entry {index} ('{headword}') has no examples"
        )));
    }

    Ok(Word {
        id: WordId::new(),
        word: headword.to_string(),
        ipa: reply.ipa,
        definition: reply.definition,
        etymology: reply.etymology,
        history: reply.history,
        mnemonic: reply.mnemonic,
        spelling_tip: reply.spelling_tip,
        examples,
        theme: theme.clone(),
        liked: false,
        disliked: false,
        favorited: false,
        audio_url: None,
    })
}

/// Turn a riddle reply into a quest for `level`.
///
/// # Errors
///
/// `ParseError` if the reply is not a JSON object with `riddle` and
/// `answer`; `SchemaValidation` if either is blank.
pub fn quest_from_reply(text: &str, level: u32) -> Result<EtymologyQuest, GenerationError> {
    let reply: QuestReply = decode_reply(text, Shape::Object)?;
    if reply.riddle.trim().is_empty() || reply.answer.trim().is_empty() {
        return Err(GenerationError::SchemaValidation(
            "quest needs a non-empty riddle and answer".into(),
        ));
    }
    Ok(EtymologyQuest::new(reply.riddle.trim(), &reply.answer, level))
}

/// Network-backed [`WordGenerator`].
pub struct GenerationClient {
    llm: LlmClient,
    prompts: PromptEngine,
    temperature: f32,
    max_tokens: u32,
    timeout_ms: u64,
}

impl GenerationClient {
    /// Wrap `llm`, rendering prompts from `prompts`.
    #[must_use]
    pub fn new(llm: LlmClient, prompts: PromptEngine, config: &LlmConfig) -> Self {
        Self {
            llm,
            prompts,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_ms: config.request_timeout_ms,
        }
    }

    /// Build the LLM client and prompt set from configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError` for a bad provider, missing key, or unreadable prompt
    /// directory.
    pub fn from_config(config: &LlmConfig, api_key: Option<String>) -> Result<Self, GenerationError> {
        let llm = LlmClient::from_config(config, api_key)?;
        let prompts = match &config.prompt_dir {
            Some(dir) => PromptEngine::from_directory(dir).map_err(GenerationError::ConfigError)?,
            None => PromptEngine::builtin(),
        };
        Ok(Self::new(llm, prompts, config))
    }

    fn request(&self, id: PromptId, vars: &[(&str, &str)]) -> Result<LlmRequest, GenerationError> {
        let (system, user) = self
            .prompts
            .render(id, vars)
            .map_err(GenerationError::ConfigError)?;
        let temperature = self
            .prompts
            .get(id)
            .and_then(|t| t.temperature)
            .unwrap_or(self.temperature);
        Ok(LlmRequest::new(system, user)
            .with_temperature(temperature)
            .with_max_tokens(self.max_tokens)
            .with_timeout(self.timeout_ms))
    }
}

impl WordGenerator for GenerationClient {
    async fn generate_word_batch(
        &self,
        theme: &Theme,
        count: usize,
        exclude: &[String],
    ) -> Result<Vec<Word>, GenerationError> {
        if count == 0 {
            return Err(GenerationError::InvalidRequest(
                "word count must be positive".into(),
            ));
        }

        let count_str = count.to_string();
        let clause = exclude_clause(
            "Do NOT include any of these words that have been seen before",
            exclude,
        );
        let request = self.request(
            PromptId::WordBatch,
            &[
                ("count", count_str.as_str()),
                ("theme", theme.label()),
                ("exclude_clause", clause.as_str()),
            ],
        )?;

        debug!(%theme, count, excluded = exclude.len(), "Requesting word batch");
        let response = self.llm.generate(&request).await?;
        let words = words_from_reply(&response.text, theme)?;

        if words.len() != count {
            warn!(requested = count, received = words.len(), "Word batch size differs from request");
        }
        info!(%theme, words = words.len(), latency_ms = response.latency_ms, "Word batch generated");
        Ok(words)
    }

    async fn generate_word_entry(&self, headword: &str, theme: &Theme) -> Result<Word, GenerationError> {
        let request = self.request(
            PromptId::WordEntry,
            &[("headword", headword), ("theme", theme.label())],
        )?;

        let response = self.llm.generate(&request).await?;
        let mut word = words_from_reply(&response.text, theme)?
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::SchemaValidation("empty word entry reply".into()))?;

        // The entry is for this headword, whatever spelling the model echoed.
        word.word = headword.to_string();
        info!(headword, latency_ms = response.latency_ms, "Word entry generated");
        Ok(word)
    }

    async fn generate_etymology_quest(
        &self,
        level: u32,
        exclude: &[String],
    ) -> Result<EtymologyQuest, GenerationError> {
        let difficulty = Difficulty::from_level(level);
        let level_str = level.to_string();
        let clause = exclude_clause("Do NOT use any of these words", exclude);
        let request = self.request(
            PromptId::EtymologyQuest,
            &[
                ("level", level_str.as_str()),
                ("difficulty", difficulty.label()),
                ("exclude_clause", clause.as_str()),
            ],
        )?;

        debug!(level, %difficulty, "Requesting etymology quest");
        let response = self.llm.generate(&request).await?;
        let quest = quest_from_reply(&response.text, level)?;
        info!(quest = %quest.id, level, latency_ms = response.latency_ms, "Etymology quest generated");
        Ok(quest)
    }
}
