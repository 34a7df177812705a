//! Session tests against a scripted generator.
//!
//! The generator hands out canned replies in order and records what it was
//! asked, so these tests can check both what reaches the bank and what the
//! session sends to the model.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use lexicon_app::{AppError, Session};
use lexicon_core::LexiconConfig;
use lexicon_core::persistence::{JsonFileStore, SqliteStore, WordBankStore};
use lexicon_core::quest::{EtymologyQuest, LoadOutcome, QuestState, Verdict};
use lexicon_core::types::{Theme, Word, WordAction, WordFilter, WordId};
use lexicon_llm::speech::Speaker;
use lexicon_llm::{GenerationError, WordGenerator};

type Reply<T> = Result<T, GenerationError>;

#[derive(Default)]
struct ScriptedGenerator {
    batches: Mutex<VecDeque<Reply<Vec<Word>>>>,
    entries: Mutex<VecDeque<Reply<Word>>>,
    quests: Mutex<VecDeque<Reply<EtymologyQuest>>>,
    batch_excludes: Mutex<Vec<Vec<String>>>,
    quest_requests: Mutex<Vec<(u32, Vec<String>)>>,
}

impl ScriptedGenerator {
    fn with_batch(self, batch: Reply<Vec<Word>>) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    fn with_entry(self, entry: Reply<Word>) -> Self {
        self.entries.lock().unwrap().push_back(entry);
        self
    }

    fn with_quest(self, quest: Reply<EtymologyQuest>) -> Self {
        self.quests.lock().unwrap().push_back(quest);
        self
    }
}

fn exhausted() -> GenerationError {
    GenerationError::Unavailable("script exhausted".into())
}

impl WordGenerator for ScriptedGenerator {
    async fn generate_word_batch(
        &self,
        theme: &Theme,
        _count: usize,
        exclude: &[String],
    ) -> Result<Vec<Word>, GenerationError> {
        self.batch_excludes.lock().unwrap().push(exclude.to_vec());
        let batch = self.batches.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))?;
        Ok(batch
            .into_iter()
            .map(|mut w| {
                w.theme = theme.clone();
                w
            })
            .collect())
    }

    async fn generate_word_entry(&self, headword: &str, theme: &Theme) -> Result<Word, GenerationError> {
        let mut entry = self.entries.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))?;
        entry.word = headword.to_string();
        entry.theme = theme.clone();
        Ok(entry)
    }

    async fn generate_etymology_quest(
        &self,
        level: u32,
        exclude: &[String],
    ) -> Result<EtymologyQuest, GenerationError> {
        self.quest_requests.lock().unwrap().push((level, exclude.to_vec()));
        self.quests.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}

fn word(headword: &str) -> Word {
    Word {
        id: WordId::new(),
        word: headword.to_string(),
        ipa: String::new(),
        definition: format!("meaning of {headword}"),
        etymology: String::new(),
        history: String::new(),
        mnemonic: String::new(),
        spelling_tip: String::new(),
        examples: vec![format!("They used {headword} in a sentence.")],
        theme: Theme::Academic,
        liked: false,
        disliked: false,
        favorited: false,
        audio_url: None,
    }
}

fn riddle(answer: &str, level: u32) -> EtymologyQuest {
    EtymologyQuest::new("Born in one tongue, it wandered into ours...", answer, level)
}

fn session_at(path: &Path, generator: ScriptedGenerator) -> Session<ScriptedGenerator> {
    Session::with_store(
        LexiconConfig::default(),
        generator,
        Box::new(JsonFileStore::new(path)),
        Speaker::disabled(),
    )
}

fn in_memory(generator: ScriptedGenerator) -> Session<ScriptedGenerator> {
    let store = SqliteStore::open_in_memory("test").expect("store");
    Session::with_store(LexiconConfig::default(), generator, Box::new(store), Speaker::disabled())
}

// ---------------------------------------------------------------------------
// Word generation and the seen set
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generated_words_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bank.json");

    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral"), word("Lucid")]));
    let mut session = session_at(&path, generator);
    let added = session.generate_words(&Theme::Literary).await.expect("generate");
    assert_eq!(added.len(), 2);
    assert!(added.iter().all(|w| w.theme == Theme::Literary));
    drop(session);

    let session = session_at(&path, ScriptedGenerator::default());
    assert_eq!(session.bank().len(), 2);
    assert!(session.bank().seen_words().contains("ephemeral"));
    assert!(session.bank().seen_words().contains("lucid"));
}

#[tokio::test]
async fn second_batch_excludes_first() {
    let generator = ScriptedGenerator::default()
        .with_batch(Ok(vec![word("Ephemeral"), word("Lucid")]))
        .with_batch(Ok(vec![word("Obfuscate")]));
    let mut session = in_memory(generator);

    session.generate_words(&Theme::Academic).await.expect("first");
    session.generate_words(&Theme::Academic).await.expect("second");

    let excludes = session.generator().batch_excludes.lock().unwrap().clone();
    assert_eq!(excludes[0], Vec::<String>::new());
    assert_eq!(excludes[1], vec!["ephemeral".to_string(), "lucid".to_string()]);
    assert_eq!(session.bank().len(), 3);
}

#[tokio::test]
async fn failed_generation_leaves_bank_untouched() {
    let generator = ScriptedGenerator::default()
        .with_batch(Ok(vec![word("Ephemeral")]))
        .with_batch(Err(GenerationError::ParseError("not json".into())));
    let mut session = in_memory(generator);

    session.generate_words(&Theme::Academic).await.expect("first");
    let err = session.generate_words(&Theme::Academic).await.expect_err("second fails");
    assert!(matches!(err, AppError::Generation(GenerationError::ParseError(_))));
    assert_eq!(session.bank().len(), 1);
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn actions_are_saved_and_unknown_ids_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bank.json");

    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral")]));
    let mut session = session_at(&path, generator);
    let added = session.generate_words(&Theme::Academic).await.expect("generate");
    let id = added[0].id.clone();

    assert!(session.apply_action(&id, WordAction::Favorite).expect("favorite"));
    assert!(session.apply_action(&id, WordAction::Dislike).expect("dislike"));
    assert!(!session.apply_action(&WordId::from("nope"), WordAction::Like).expect("no-op"));
    drop(session);

    let session = session_at(&path, ScriptedGenerator::default());
    let restored = session.word(&id).expect("word");
    assert!(restored.favorited && restored.disliked && !restored.liked);
    assert_eq!(session.words(WordFilter::FavoritesOnly).count(), 1);
    assert!(matches!(
        session.word(&WordId::from("nope")),
        Err(AppError::UnknownWord(_))
    ));
}

#[tokio::test]
async fn speak_without_engine_is_not_an_error() {
    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral")]));
    let mut session = in_memory(generator);
    let added = session.generate_words(&Theme::Academic).await.expect("generate");

    assert!(!session.speak(&added[0].id).expect("soft failure"));
    assert!(session.speak(&WordId::from("nope")).is_err());
}

// ---------------------------------------------------------------------------
// Import / export / clear
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_to_dir_then_import_into_fresh_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral"), word("Lucid")]));
    let mut session = in_memory(generator);
    session.generate_words(&Theme::Academic).await.expect("generate");

    let path = session.export_to_dir(dir.path()).expect("export");
    let name = path.file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("lexicon-luminary-") && name.ends_with(".json"));

    let text = std::fs::read_to_string(&path).expect("read");
    let mut fresh = in_memory(ScriptedGenerator::default());
    fresh.import_text(&text).expect("import");
    assert_eq!(fresh.bank(), session.bank());
}

#[tokio::test]
async fn bad_import_keeps_current_bank() {
    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral")]));
    let mut session = in_memory(generator);
    session.generate_words(&Theme::Academic).await.expect("generate");

    let err = session.import_text(r#"{"notWords": []}"#).expect_err("should fail");
    assert!(matches!(err, AppError::Lexicon(_)));
    assert_eq!(session.bank().len(), 1);

    session.import_text(r#"{"words": []}"#).expect("empty import");
    assert!(session.bank().is_empty());
    assert!(session.bank().seen_words().is_empty());
}

#[tokio::test]
async fn clear_storage_empties_bank_and_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bank.json");
    let generator = ScriptedGenerator::default().with_batch(Ok(vec![word("Ephemeral")]));
    let mut session = session_at(&path, generator);
    session.generate_words(&Theme::Academic).await.expect("generate");

    session.clear_storage().expect("clear");
    assert!(session.bank().is_empty());
    assert!(JsonFileStore::new(&path).load().expect("load").is_none());
}

#[test]
fn unreadable_saved_bank_starts_empty() {
    let store = SqliteStore::open_in_memory("test").expect("store");
    store.put_raw("{ this is not json").expect("put");
    let session = Session::with_store(
        LexiconConfig::default(),
        ScriptedGenerator::default(),
        Box::new(store),
        Speaker::disabled(),
    );
    assert!(session.bank().is_empty());
}

// ---------------------------------------------------------------------------
// Etymology quest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn correct_answer_scores_and_unlocks_word() {
    let generator = ScriptedGenerator::default()
        .with_quest(Ok(riddle("Serendipity", 1)))
        .with_entry(Ok(word("whatever the model said")))
        .with_quest(Ok(riddle("quarantine", 2)));
    let mut session = in_memory(generator);

    session.next_quest().await.expect("quest");
    let outcome = session
        .submit_answer("Serendipity ")
        .await
        .expect("submit")
        .expect("judged");

    assert_eq!(outcome.judgement.verdict, Verdict::Correct);
    assert_eq!(outcome.judgement.points, 10);
    assert_eq!(session.quest().score(), 10);
    let unlocked = outcome.unlocked.expect("unlocked word");
    assert_eq!(unlocked.word, "serendipity");
    assert_eq!(session.bank().len(), 1);
    assert!(session.bank().seen_words().contains("serendipity"));

    let next = session.next_quest().await.expect("next quest");
    assert_eq!(next.level, 2);
    let requests = session.generator().quest_requests.lock().unwrap().clone();
    assert_eq!(requests[1], (2, vec!["serendipity".to_string()]));
}

#[tokio::test]
async fn failed_unlock_keeps_points() {
    let generator = ScriptedGenerator::default()
        .with_quest(Ok(riddle("serendipity", 1)))
        .with_entry(Err(GenerationError::Timeout(30_000)));
    let mut session = in_memory(generator);

    session.next_quest().await.expect("quest");
    let outcome = session.submit_answer("serendipity").await.expect("submit").expect("judged");
    assert_eq!(outcome.judgement.verdict, Verdict::Correct);
    assert!(outcome.unlocked.is_none());
    assert_eq!(session.quest().score(), 10);
    assert!(session.bank().is_empty());
}

#[tokio::test]
async fn wrong_answer_reveals_and_keeps_level() {
    let generator = ScriptedGenerator::default()
        .with_quest(Ok(riddle("serendipity", 1)))
        .with_quest(Ok(riddle("quarantine", 1)));
    let mut session = in_memory(generator);

    session.next_quest().await.expect("quest");
    let outcome = session.submit_answer("luck").await.expect("submit").expect("judged");
    assert_eq!(outcome.judgement.verdict, Verdict::Incorrect);
    assert_eq!(outcome.judgement.answer, "serendipity");
    assert_eq!(session.quest().score(), 0);

    let next = session.next_quest().await.expect("next");
    assert_eq!(next.level, 1);
}

#[tokio::test]
async fn blank_and_out_of_turn_answers() {
    let generator = ScriptedGenerator::default().with_quest(Ok(riddle("serendipity", 1)));
    let mut session = in_memory(generator);

    assert!(matches!(
        session.submit_answer("anything").await,
        Err(AppError::NoActiveQuest)
    ));

    session.next_quest().await.expect("quest");
    assert!(session.submit_answer("   ").await.expect("blank").is_none());
    assert!(matches!(session.quest().state(), QuestState::Presented { .. }));
}

#[tokio::test]
async fn stale_quest_reply_is_dropped() {
    let generator = ScriptedGenerator::default()
        .with_quest(Ok(riddle("serendipity", 1)))
        .with_quest(Ok(riddle("sesquipedalian", 3)));
    let mut session = in_memory(generator);
    let generator = session.generator();

    let first = session.begin_quest();
    let second = session.set_level(3);
    assert!(second.ticket > first.ticket);

    let late = first.fetch(generator.as_ref()).await;
    assert_eq!(session.finish_quest(first.ticket, late).expect("stale"), LoadOutcome::Stale);
    assert!(matches!(session.quest().state(), QuestState::Loading { .. }));

    let fresh = second.fetch(generator.as_ref()).await;
    assert_eq!(session.finish_quest(second.ticket, fresh).expect("applied"), LoadOutcome::Applied);
    let quest = session.quest().current_quest().expect("presented");
    assert_eq!(quest.answer, "sesquipedalian");
    assert_eq!(session.quest().level(), 3);
    assert_eq!(session.quest().score(), 0);
}

#[tokio::test]
async fn quest_load_failure_surfaces_and_returns_to_idle() {
    let generator = ScriptedGenerator::default()
        .with_quest(Err(GenerationError::RetriesExhausted {
            attempts: 3,
            last_error: "HTTP 503".into(),
        }));
    let mut session = in_memory(generator);

    let err = session.next_quest().await.expect_err("should fail");
    assert!(matches!(err, AppError::Generation(GenerationError::RetriesExhausted { .. })));
    assert_eq!(session.quest().state(), &QuestState::Idle);
}

#[tokio::test]
async fn stale_failure_is_ignored() {
    let generator = ScriptedGenerator::default();
    let mut session = in_memory(generator);

    let first = session.begin_quest();
    let _second = session.begin_quest();
    let outcome = session
        .finish_quest(first.ticket, Err(GenerationError::Timeout(1)))
        .expect("stale failure is not an error");
    assert_eq!(outcome, LoadOutcome::Stale);
    assert!(matches!(session.quest().state(), QuestState::Loading { .. }));
}
