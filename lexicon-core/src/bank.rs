//! The word bank: the session's accumulated vocabulary.
//!
//! A [`WordBank`] is an append-only list of [`Word`]s plus the set of
//! lowercase headwords seen so far. The seen set only steers future
//! generation requests away from repeats; it never blocks a word from
//! being added.
//!
//! Invariant after every mutation:
//! `seen ⊇ { w.word.to_lowercase() | w ∈ words }`.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::types::{StoredWordBank, Word, WordAction, WordFilter, WordId};

/// Counts shown on the progress panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BankStats {
    /// Total words collected.
    pub words: usize,
    /// Words starred as favorites.
    pub favorites: usize,
    /// Words with a thumbs up.
    pub liked: usize,
    /// Words with a thumbs down.
    pub disliked: usize,
}

/// In-memory word collection plus the seen-word set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBank {
    words: Vec<Word>,
    seen: BTreeSet<String>,
}

impl WordBank {
    /// Create a new empty word bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bank from its stored form.
    ///
    /// The stored seen list is taken as-is and then every stored headword is
    /// folded in, so a hand-edited or partial document still satisfies the
    /// seen-set invariant.
    #[must_use]
    pub fn from_stored(stored: StoredWordBank) -> Self {
        let mut seen: BTreeSet<String> = stored.seen_words.into_iter().collect();
        seen.extend(stored.words.iter().map(Word::normalized));
        Self {
            words: stored.words,
            seen,
        }
    }

    /// Snapshot the bank in its stored form.
    #[must_use]
    pub fn to_stored(&self) -> StoredWordBank {
        StoredWordBank {
            words: self.words.clone(),
            seen_words: self.seen.iter().cloned().collect(),
        }
    }

    /// Append a batch of words.
    ///
    /// Duplicate headwords are kept: a quest resolution may deliberately add
    /// a word the generator already produced.
    pub fn add_words(&mut self, batch: impl IntoIterator<Item = Word>) {
        let before = self.words.len();
        for word in batch {
            self.seen.insert(word.normalized());
            self.words.push(word);
        }
        debug!(
            added = self.words.len() - before,
            total = self.words.len(),
            seen = self.seen.len(),
            "Words added to bank"
        );
    }

    /// Apply a like / dislike / favorite toggle to the word with `id`.
    ///
    /// Returns `false` and leaves the bank untouched if no word has that id.
    pub fn apply_action(&mut self, id: &WordId, action: WordAction) -> bool {
        let Some(word) = self.words.iter_mut().find(|w| &w.id == id) else {
            debug!(%id, %action, "Action on unknown word ignored");
            return false;
        };

        match action {
            WordAction::Like => {
                word.liked = !word.liked;
                word.disliked = false;
            }
            WordAction::Dislike => {
                word.disliked = !word.disliked;
                word.liked = false;
            }
            WordAction::Favorite => {
                word.favorited = !word.favorited;
            }
        }
        true
    }

    /// Words passing `filter`, in insertion order.
    pub fn filter(&self, filter: WordFilter) -> impl Iterator<Item = &Word> + '_ {
        self.words.iter().filter(move |w| filter.matches(w))
    }

    /// Look up a word by id.
    #[must_use]
    pub fn get(&self, id: &WordId) -> Option<&Word> {
        self.words.iter().find(|w| &w.id == id)
    }

    /// All words, in insertion order.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The seen-word set.
    #[must_use]
    pub fn seen_words(&self) -> &BTreeSet<String> {
        &self.seen
    }

    /// Seen headwords as a sorted list, ready to hand to a generator.
    #[must_use]
    pub fn exclude_list(&self) -> Vec<String> {
        self.seen.iter().cloned().collect()
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the bank holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Progress counters.
    #[must_use]
    pub fn stats(&self) -> BankStats {
        self.words.iter().fold(
            BankStats {
                words: self.words.len(),
                ..BankStats::default()
            },
            |mut stats, w| {
                stats.favorites += usize::from(w.favorited);
                stats.liked += usize::from(w.liked);
                stats.disliked += usize::from(w.disliked);
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Theme;

    fn word(id: &str, headword: &str) -> Word {
        Word {
            id: WordId::from(id),
            word: headword.to_string(),
            ipa: String::new(),
            definition: format!("definition of {headword}"),
            etymology: String::new(),
            history: String::new(),
            mnemonic: String::new(),
            spelling_tip: String::new(),
            examples: vec![format!("An example with {headword}.")],
            theme: Theme::Academic,
            liked: false,
            disliked: false,
            favorited: false,
            audio_url: None,
        }
    }

    #[test]
    fn add_words_updates_seen_set_lowercase() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "Ephemeral"), word("2", "LUCID")]);

        assert_eq!(bank.len(), 2);
        assert!(bank.seen_words().contains("ephemeral"));
        assert!(bank.seen_words().contains("lucid"));
        assert_eq!(bank.exclude_list(), vec!["ephemeral", "lucid"]);
    }

    #[test]
    fn duplicate_headwords_are_kept() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "serendipity")]);
        bank.add_words([word("2", "Serendipity")]);

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.seen_words().len(), 1);
    }

    #[test]
    fn like_clears_dislike_and_toggles() {
        let mut bank = WordBank::new();
        let mut w = word("1", "ephemeral");
        w.disliked = true;
        bank.add_words([w]);
        let id = WordId::from("1");

        assert!(bank.apply_action(&id, WordAction::Like));
        let w = bank.get(&id).expect("word");
        assert!(w.liked);
        assert!(!w.disliked);

        assert!(bank.apply_action(&id, WordAction::Like));
        let w = bank.get(&id).expect("word");
        assert!(!w.liked);
        assert!(!w.disliked);
    }

    #[test]
    fn favorite_is_independent_of_like_dislike() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "ephemeral")]);
        let id = WordId::from("1");

        bank.apply_action(&id, WordAction::Favorite);
        let w = bank.get(&id).expect("word");
        assert!(w.favorited);

        bank.apply_action(&id, WordAction::Dislike);
        let w = bank.get(&id).expect("word");
        assert!(w.disliked);
        assert!(!w.liked);
        assert!(w.favorited, "favorite survives a dislike");
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "ephemeral")]);
        let before = bank.clone();

        assert!(!bank.apply_action(&WordId::from("missing"), WordAction::Like));
        assert_eq!(bank, before);
    }

    #[test]
    fn filter_preserves_insertion_order() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "alpha"), word("2", "beta"), word("3", "gamma")]);
        bank.apply_action(&WordId::from("3"), WordAction::Favorite);
        bank.apply_action(&WordId::from("1"), WordAction::Favorite);

        let all: Vec<_> = bank.filter(WordFilter::All).map(|w| w.word.as_str()).collect();
        assert_eq!(all, ["alpha", "beta", "gamma"]);

        let favs: Vec<_> = bank
            .filter(WordFilter::FavoritesOnly)
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(favs, ["alpha", "gamma"]);
    }

    #[test]
    fn from_stored_restores_seen_superset() {
        let stored = StoredWordBank {
            words: vec![word("1", "Quixotic")],
            seen_words: vec!["laconic".into()],
        };
        let bank = WordBank::from_stored(stored);
        assert!(bank.seen_words().contains("quixotic"));
        assert!(bank.seen_words().contains("laconic"));
    }

    #[test]
    fn stats_count_flags() {
        let mut bank = WordBank::new();
        bank.add_words([word("1", "a"), word("2", "b"), word("3", "c")]);
        bank.apply_action(&WordId::from("1"), WordAction::Favorite);
        bank.apply_action(&WordId::from("1"), WordAction::Like);
        bank.apply_action(&WordId::from("2"), WordAction::Dislike);

        let stats = bank.stats();
        assert_eq!(
            stats,
            BankStats {
                words: 3,
                favorites: 1,
                liked: 1,
                disliked: 1,
            }
        );
    }
}
