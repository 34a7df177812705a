//! Core type definitions for the Lexicon word bank.
//!
//! Everything here is serializable in the record shape the store, the
//! export file and the import path share: camelCase field names and a
//! `{ "words": [...], "seenWords": [...] }` envelope.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a word entry.
///
/// Generated ids are UUID v4 strings. Ids read back from storage or an
/// imported document are kept verbatim, whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub String);

impl WordId {
    /// Create a new random word ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an etymology quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestId(pub Uuid);

impl QuestId {
    /// Create a new random quest ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quest-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Category label used to bias word generation.
///
/// Serialized as a bare string: the four fixed names map to their variants,
/// anything else is kept as [`Theme::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    /// Scholarly register.
    #[default]
    Academic,
    /// Science and technology.
    Scientific,
    /// Literature and rhetoric.
    Literary,
    /// Business and office language.
    Corporate,
    /// Free-form user-supplied theme.
    Custom(String),
}

impl Theme {
    /// The fixed (non-custom) themes, in menu order.
    pub const FIXED: [Theme; 4] = [
        Theme::Academic,
        Theme::Scientific,
        Theme::Literary,
        Theme::Corporate,
    ];

    /// The label sent to the generator and shown on cards.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Academic => "Academic",
            Self::Scientific => "Scientific",
            Self::Literary => "Literary",
            Self::Corporate => "Corporate",
            Self::Custom(text) => text,
        }
    }

    /// Whether this is a free-form theme.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Academic" => Self::Academic,
            "Scientific" => Self::Scientific,
            "Literary" => Self::Literary,
            "Corporate" => Self::Corporate,
            _ => Self::Custom(s),
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Custom(text) => text,
            fixed => fixed.label().to_string(),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    /// Parses a theme name, case-insensitively for the fixed themes.
    ///
    /// Blank input is rejected: a custom theme needs some text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("theme must not be empty".to_string());
        }
        let fixed = Self::FIXED
            .iter()
            .find(|t| t.label().eq_ignore_ascii_case(trimmed));
        Ok(fixed.cloned().unwrap_or_else(|| Self::Custom(trimmed.to_string())))
    }
}

// ---------------------------------------------------------------------------
// Word
// ---------------------------------------------------------------------------

/// A single vocabulary entry.
///
/// Only the three flags change after creation; `theme` and the text fields
/// are fixed by whatever generated the word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Unique within a bank.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: WordId,
    /// The headword itself.
    #[serde(default, deserialize_with = "null_as_default")]
    pub word: String,
    /// IPA transcription.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ipa: String,
    /// Concise definition.
    #[serde(default, deserialize_with = "null_as_default")]
    pub definition: String,
    /// Etymological roots.
    #[serde(default, deserialize_with = "null_as_default")]
    pub etymology: String,
    /// Narrative of the word's evolution.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: String,
    /// Memory aid.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mnemonic: String,
    /// Spelling tip.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spelling_tip: String,
    /// Usage examples, in the order generated.
    #[serde(default, deserialize_with = "one_or_many")]
    pub examples: Vec<String>,
    /// Theme the word was generated under.
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: Theme,
    /// Thumbs up.
    #[serde(default, deserialize_with = "null_as_default")]
    pub liked: bool,
    /// Thumbs down.
    #[serde(default, deserialize_with = "null_as_default")]
    pub disliked: bool,
    /// Starred.
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorited: bool,
    /// Pre-rendered pronunciation, if any source supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Word {
    /// Lowercase form of the headword, as recorded in the seen-word set.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.word.to_lowercase()
    }
}

/// Treat an explicit `null` like a missing field.
///
/// Generators emit `"ipa": null` for fields they could not fill.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept either a sequence of strings or a single string.
///
/// Generators and hand-edited exports sometimes collapse a one-element
/// `examples` list into a bare string; `null` becomes an empty list.
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// A user reaction to a word card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordAction {
    /// Toggle liked, clear disliked.
    Like,
    /// Toggle disliked, clear liked.
    Dislike,
    /// Toggle favorited.
    Favorite,
}

impl fmt::Display for WordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Favorite => "favorite",
        };
        f.write_str(name)
    }
}

/// Which words a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordFilter {
    /// Every word, in insertion order.
    #[default]
    All,
    /// Favorited words only.
    FavoritesOnly,
}

impl WordFilter {
    /// Whether `word` passes this filter.
    #[must_use]
    pub fn matches(self, word: &Word) -> bool {
        match self {
            Self::All => true,
            Self::FavoritesOnly => word.favorited,
        }
    }
}

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// The serialized form of a word bank.
///
/// This is the exact document written to storage and to export files.
/// `seenWords` is a sequence here; the live bank holds it as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWordBank {
    /// Words in insertion order.
    pub words: Vec<Word>,
    /// Lowercase headwords seen so far.
    #[serde(default)]
    pub seen_words: Vec<String>,
}
