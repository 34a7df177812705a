//! The learner's session: one word bank, one quest game, one store.
//!
//! Every bank mutation is written through to the store before the call
//! returns. Quest loads are split into three steps (issue a ticket, fetch,
//! apply) so a front end can fire a request, let the learner change level,
//! and still have the late reply dropped instead of overwriting the newer
//! round.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use lexicon_core::bank::{BankStats, WordBank};
use lexicon_core::config::{LexiconConfig, LlmConfig};
use lexicon_core::persistence::{WordBankStore, open_store};
use lexicon_core::quest::{EtymologyQuest, Judgement, LoadOutcome, QuestGame, QuestState, QuestTicket, Verdict};
use lexicon_core::transfer;
use lexicon_core::types::{Theme, Word, WordAction, WordFilter, WordId};
use lexicon_llm::speech::Speaker;
use lexicon_llm::{GenerationError, WordGenerator};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};

/// Look up the API key named by `config.api_key_env` through `lookup`.
///
/// Providers that need no key get `Ok(None)`.
///
/// # Errors
///
/// [`AppError::MissingApiKey`] if the provider needs a key and `lookup`
/// has none (or only whitespace).
pub fn resolve_api_key(
    config: &LlmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<String>> {
    let key = lookup(&config.api_key_env)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    if key.is_none() && config.requires_api_key() {
        return Err(AppError::MissingApiKey {
            env: config.api_key_env.clone(),
        });
    }
    Ok(key)
}

/// A quest request that has been issued but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingQuest {
    /// Ticket the reply must present to be accepted.
    pub ticket: QuestTicket,
    /// Level the riddle is requested for.
    pub level: u32,
    /// Words the riddle must not be about.
    pub exclude: Vec<String>,
}

impl PendingQuest {
    /// Ask `generator` for the riddle.
    ///
    /// # Errors
    ///
    /// Whatever the generator fails with.
    pub async fn fetch<G: WordGenerator>(
        &self,
        generator: &G,
    ) -> std::result::Result<EtymologyQuest, GenerationError> {
        generator.generate_etymology_quest(self.level, &self.exclude).await
    }
}

/// What came of answering a riddle.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// The verdict, points and revealed answer.
    pub judgement: Judgement,
    /// Word added to the bank for a correct answer, if its entry could be
    /// generated.
    pub unlocked: Option<Word>,
}

/// A learner's session.
pub struct Session<G> {
    generator: Arc<G>,
    store: Box<dyn WordBankStore>,
    bank: WordBank,
    quest: QuestGame,
    speaker: Speaker,
    config: LexiconConfig,
}

impl<G: WordGenerator> Session<G> {
    /// Open the configured store and restore the saved bank.
    ///
    /// # Errors
    ///
    /// Fails only if the store itself cannot be opened; an unreadable saved
    /// bank starts the session empty.
    pub fn open(config: LexiconConfig, generator: G) -> Result<Self> {
        let store = open_store(&config.persistence)?;
        let speaker = Speaker::from_config(&config.speech);
        Ok(Self::with_store(config, generator, store, speaker))
    }

    /// Build a session over an already-open store.
    #[must_use]
    pub fn with_store(
        config: LexiconConfig,
        generator: G,
        store: Box<dyn WordBankStore>,
        speaker: Speaker,
    ) -> Self {
        let bank = match store.load() {
            Ok(Some(stored)) => WordBank::from_stored(stored),
            Ok(None) => WordBank::new(),
            Err(e) => {
                warn!(error = %e, "Could not read saved word bank; starting empty");
                WordBank::new()
            }
        };
        info!(words = bank.len(), seen = bank.seen_words().len(), "Session opened");

        let quest = QuestGame::new(config.quest.starting_level, config.quest.points_per_level);
        Self {
            generator: Arc::new(generator),
            store,
            bank,
            quest,
            speaker,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The word bank.
    #[must_use]
    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    /// The quest game.
    #[must_use]
    pub fn quest(&self) -> &QuestGame {
        &self.quest
    }

    /// Configuration the session was opened with.
    #[must_use]
    pub fn config(&self) -> &LexiconConfig {
        &self.config
    }

    /// Shared handle to the generator, for fetching outside a `&mut` borrow.
    #[must_use]
    pub fn generator(&self) -> Arc<G> {
        Arc::clone(&self.generator)
    }

    /// Theme used when none is given.
    #[must_use]
    pub fn default_theme(&self) -> Theme {
        self.config
            .generation
            .default_theme
            .parse()
            .unwrap_or_default()
    }

    /// Words passing `filter`, in collection order.
    pub fn words(&self, filter: WordFilter) -> impl Iterator<Item = &Word> + '_ {
        self.bank.filter(filter)
    }

    /// Look up one word.
    ///
    /// # Errors
    ///
    /// [`AppError::UnknownWord`] if no word has this id.
    pub fn word(&self, id: &WordId) -> Result<&Word> {
        self.bank
            .get(id)
            .ok_or_else(|| AppError::UnknownWord(id.to_string()))
    }

    /// Progress counters.
    #[must_use]
    pub fn stats(&self) -> BankStats {
        self.bank.stats()
    }

    // -----------------------------------------------------------------------
    // Word bank
    // -----------------------------------------------------------------------

    /// Generate a batch of `config.generation.batch_size` new words and add
    /// them to the bank. Returns the new words.
    ///
    /// # Errors
    ///
    /// Generation failures leave the bank untouched. A save failure is
    /// returned after the words were added in memory.
    pub async fn generate_words(&mut self, theme: &Theme) -> Result<Vec<Word>> {
        let count = self.config.generation.batch_size;
        self.generate_words_n(theme, count).await
    }

    /// Like [`Session::generate_words`] with an explicit batch size.
    ///
    /// # Errors
    ///
    /// See [`Session::generate_words`].
    pub async fn generate_words_n(&mut self, theme: &Theme, count: usize) -> Result<Vec<Word>> {
        let exclude = self.bank.exclude_list();
        let words = self
            .generator
            .generate_word_batch(theme, count, &exclude)
            .await?;

        self.bank.add_words(words.iter().cloned());
        self.persist()?;
        info!(%theme, added = words.len(), total = self.bank.len(), "Words added");
        Ok(words)
    }

    /// Toggle like, dislike or favorite on a word and save.
    ///
    /// Returns `false` (and saves nothing) when no word has this id.
    ///
    /// # Errors
    ///
    /// Returns the store's error if saving fails.
    pub fn apply_action(&mut self, id: &WordId, action: WordAction) -> Result<bool> {
        if !self.bank.apply_action(id, action) {
            debug!(%id, %action, "Action on unknown word ignored");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Pronounce a word. Returns whether playback started.
    ///
    /// # Errors
    ///
    /// [`AppError::UnknownWord`] if no word has this id. A missing speech
    /// engine is not an error.
    pub fn speak(&self, id: &WordId) -> Result<bool> {
        let word = self.word(id)?;
        Ok(self.speaker.speak(&word.word))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist(&self) -> Result<()> {
        self.store.save(&self.bank.to_stored())?;
        Ok(())
    }

    /// The bank as a pretty-printed export document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export_text(&self) -> Result<String> {
        Ok(transfer::export_text(&self.bank.to_stored())?)
    }

    /// Write an export document into `dir` under a timestamped name.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(transfer::export_file_name(Utc::now()));
        let text = self.export_text()?;
        std::fs::write(&path, text).map_err(lexicon_core::LexiconError::from)?;
        info!(path = %path.display(), words = self.bank.len(), "Word bank exported");
        Ok(path)
    }

    /// Replace the bank with an imported document and save it.
    ///
    /// # Errors
    ///
    /// [`lexicon_core::LexiconError::Import`] for a malformed document, in
    /// which case the bank is unchanged.
    pub fn import_text(&mut self, text: &str) -> Result<()> {
        let stored = transfer::import_text(text)?;
        self.bank = WordBank::from_stored(stored);
        self.persist()?;
        info!(words = self.bank.len(), seen = self.bank.seen_words().len(), "Word bank imported");
        Ok(())
    }

    /// Delete the saved record and empty the bank.
    ///
    /// # Errors
    ///
    /// Returns the store's error if deleting fails.
    pub fn clear_storage(&mut self) -> Result<()> {
        self.store.clear()?;
        self.bank = WordBank::new();
        info!("Word bank cleared");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Etymology quest
    // -----------------------------------------------------------------------

    fn pending(&self, ticket: QuestTicket) -> PendingQuest {
        PendingQuest {
            ticket,
            level: self.quest.level(),
            exclude: self.bank.exclude_list(),
        }
    }

    /// Start loading the next riddle, applying any pending level-up.
    pub fn begin_quest(&mut self) -> PendingQuest {
        let ticket = self.quest.next();
        self.pending(ticket)
    }

    /// Jump to `level` and start loading a riddle for it.
    pub fn set_level(&mut self, level: u32) -> PendingQuest {
        let ticket = self.quest.set_level(level);
        self.pending(ticket)
    }

    /// Hand the result of a quest fetch back to the game.
    ///
    /// A reply for a superseded ticket is dropped, successful or not.
    ///
    /// # Errors
    ///
    /// The generation error, if the fetch for the current ticket failed.
    pub fn finish_quest(
        &mut self,
        ticket: QuestTicket,
        result: std::result::Result<EtymologyQuest, GenerationError>,
    ) -> Result<LoadOutcome> {
        match result {
            Ok(quest) => Ok(self.quest.apply_loaded(ticket, quest)),
            Err(e) => match self.quest.fail_load(ticket) {
                LoadOutcome::Applied => {
                    warn!(ticket = ticket.sequence(), error = %e, "Quest load failed");
                    Err(e.into())
                }
                LoadOutcome::Stale => Ok(LoadOutcome::Stale),
            },
        }
    }

    /// Begin, fetch and apply the next riddle in one go.
    ///
    /// # Errors
    ///
    /// The generation error if the riddle could not be produced.
    pub async fn next_quest(&mut self) -> Result<&EtymologyQuest> {
        let pending = self.begin_quest();
        let result = pending.fetch(self.generator.as_ref()).await;
        self.finish_quest(pending.ticket, result)?;
        self.quest
            .current_quest()
            .ok_or(AppError::NoActiveQuest)
    }

    /// Answer the riddle on screen.
    ///
    /// Blank answers are ignored (`Ok(None)`). On a correct answer an entry
    /// for the word is generated and added to the bank; if that fails the
    /// points still stand.
    ///
    /// # Errors
    ///
    /// [`AppError::NoActiveQuest`] when no riddle awaits an answer, or a
    /// save failure after the unlocked word was added.
    pub async fn submit_answer(&mut self, attempt: &str) -> Result<Option<AnswerOutcome>> {
        if !matches!(self.quest.state(), QuestState::Presented { .. }) {
            return Err(AppError::NoActiveQuest);
        }
        let Some(judgement) = self.quest.submit(attempt) else {
            return Ok(None);
        };

        let unlocked = if judgement.verdict == Verdict::Correct {
            self.unlock(&judgement.answer).await?
        } else {
            None
        };
        Ok(Some(AnswerOutcome { judgement, unlocked }))
    }

    async fn unlock(&mut self, answer: &str) -> Result<Option<Word>> {
        let theme: Theme = self
            .config
            .quest
            .unlock_theme
            .parse()
            .unwrap_or_default();

        match self.generator.generate_word_entry(answer, &theme).await {
            Ok(word) => {
                self.bank.add_words(std::iter::once(word.clone()));
                self.persist()?;
                info!(word = %word.word, "Quest word unlocked");
                Ok(Some(word))
            }
            Err(e) => {
                warn!(answer, error = %e, "Could not generate entry for solved quest");
                Ok(None)
            }
        }
    }
}
