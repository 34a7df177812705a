//! Prompt templates for Lexicon generation calls.
//!
//! Every prompt is a versioned, testable artifact. The built-in templates
//! below are used unless a directory of TOML overrides is configured.

pub const WORD_BATCH_SYSTEM: &str = r"You are a lexicographer and etymologist writing entries for a vocabulary-building app.
Your entries are accurate, vivid and memorable.
You respond with raw JSON only. No commentary, no markdown.";

pub const WORD_BATCH_USER: &str = r#"Generate exactly {count} sophisticated English words suitable for the "{theme}" theme.{exclude_clause}

For each word, provide:
1. The word itself
2. IPA phonetic transcription
3. Concise definition
4. Etymological roots (language of origin and original meaning)
5. A narrative history of the word's evolution (2-3 sentences)
6. A creative memory mnemonic
7. A spelling tip
8. 2-3 usage examples in different contexts

Format the response as a JSON array of objects with these exact keys:
word, ipa, definition, etymology, history, mnemonic, spellingTip, examples (array)

Respond ONLY with the JSON array, no additional text."#;

pub const WORD_ENTRY_USER: &str = r#"Write a vocabulary entry for the English word "{headword}" in the "{theme}" theme.

Provide:
1. The word itself, exactly as given
2. IPA phonetic transcription
3. Concise definition
4. Etymological roots (language of origin and original meaning)
5. A narrative history of the word's evolution (2-3 sentences)
6. A creative memory mnemonic
7. A spelling tip
8. 2-3 usage examples in different contexts

Format the response as a JSON array containing one object with these exact keys:
word, ipa, definition, etymology, history, mnemonic, spellingTip, examples (array)

Respond ONLY with the JSON array, no additional text."#;

pub const QUEST_SYSTEM: &str = r"You are a linguistic detective who writes riddles about word origins.
Your riddles are poetic and mysterious, and never name the word they describe.
You respond with raw JSON only. No commentary, no markdown.";

pub const QUEST_USER: &str = r#"Create a linguistic detective challenge for level {level} ({difficulty} difficulty).{exclude_clause}

Generate an "Ancient Tale" - a creative riddle that describes the historical origin and evolution of an English word WITHOUT naming the word itself. The riddle should be poetic and mysterious, hinting at:
- The language(s) it came from
- Its original meaning
- How its meaning evolved over time
- Cultural or historical context

The word should be appropriate for {difficulty} level vocabulary learners.

Format the response as JSON with these exact keys:
riddle (the ancient tale text), answer (the word being described)

Respond ONLY with the JSON object, no additional text."#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value in a single pass, so a
/// value containing `{other}` is inserted literally. Unknown placeholders
/// are left as written.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// The sentence appended to a prompt listing words the model must avoid.
///
/// Empty when there is nothing to exclude.
#[must_use]
pub fn exclude_clause(lead: &str, exclude: &[String]) -> String {
    if exclude.is_empty() {
        String::new()
    } else {
        format!("\n\nIMPORTANT: {lead}: {}", exclude.join(", "))
    }
}

// ---------------------------------------------------------------------------
// PromptEngine: Versioned TOML Template Loader
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// A themed batch of new words.
    WordBatch,
    /// One entry for a known headword (quest unlocks).
    WordEntry,
    /// An etymology riddle.
    EtymologyQuest,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::WordBatch => "word_batch.toml",
            Self::WordEntry => "word_entry.toml",
            Self::EtymologyQuest => "etymology_quest.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::WordBatch, Self::WordEntry, Self::EtymologyQuest]
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WordBatch => "word_batch",
            Self::WordEntry => "word_entry",
            Self::EtymologyQuest => "etymology_quest",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word_batch" => Ok(Self::WordBatch),
            "word_entry" => Ok(Self::WordEntry),
            "etymology_quest" => Ok(Self::EtymologyQuest),
            _ => Err(format!("unknown prompt id: '{s}'")),
        }
    }
}

/// Metadata and templates parsed from a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    system: String,
    user: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0").
    pub version: String,
    /// Sampling temperature override; the configured one when `None`.
    pub temperature: Option<f32>,
    /// System prompt template (may be empty).
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Engine that loads versioned TOML prompt templates and renders them.
///
/// # Example
///
/// ```no_run
/// use lexicon_llm::prompt::{PromptEngine, PromptId};
///
/// let engine = PromptEngine::from_directory("lexicon-llm/prompts/v1").unwrap();
/// let (_system, user) = engine
///     .render(PromptId::WordBatch, &[("count", "10"), ("theme", "Literary")])
///     .unwrap();
/// assert!(user.contains("Literary"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptEngine {
    /// Create a `PromptEngine` pre-loaded with the built-in constant templates.
    #[must_use]
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();

        templates.insert(PromptId::WordBatch, PromptTemplate {
            version: "builtin".into(),
            temperature: None,
            system: WORD_BATCH_SYSTEM.into(),
            user: WORD_BATCH_USER.into(),
        });

        templates.insert(PromptId::WordEntry, PromptTemplate {
            version: "builtin".into(),
            temperature: Some(0.4),
            system: WORD_BATCH_SYSTEM.into(),
            user: WORD_ENTRY_USER.into(),
        });

        templates.insert(PromptId::EtymologyQuest, PromptTemplate {
            version: "builtin".into(),
            temperature: None,
            system: QUEST_SYSTEM.into(),
            user: QUEST_USER.into(),
        });

        Self { templates }
    }

    /// Load prompt templates from a directory of TOML files.
    ///
    /// Each TOML file must match a known [`PromptId`] filename. Prompts with
    /// no file keep their built-in template.
    ///
    /// # Errors
    ///
    /// Returns an error if a TOML file exists but cannot be parsed, or the
    /// directory holds none of the known files.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, String> {
        let dir = dir.as_ref();
        let mut engine = Self::builtin();
        let mut loaded = 0;

        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
                let parsed: TomlPromptFile = toml::from_str(&content)
                    .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;

                let d = parsed.prompt;
                engine.templates.insert(*id, PromptTemplate {
                    version: d.version,
                    temperature: d.temperature,
                    system: d.system,
                    user: d.user,
                });
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(format!(
                "no prompt templates found in directory: {}",
                dir.display()
            ));
        }

        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render both system and user prompts for a given ID.
    ///
    /// Returns `(system_prompt, user_prompt)` with all `{key}` placeholders
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt ID is not loaded.
    pub fn render(
        &self,
        id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<(String, String), String> {
        let tpl = self.get(id).ok_or_else(|| {
            format!("prompt template '{id}' not loaded")
        })?;

        let system = render_template(&tpl.system, vars);
        let user = render_template(&tpl.user, vars);
        Ok((system, user))
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
