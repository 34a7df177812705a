//! Fixtures shared by the Lexicon Luminary benchmarks.

use lexicon_core::bank::WordBank;
use lexicon_core::types::{Theme, Word, WordId};

/// A fully populated word, headword `Word{i}`.
#[must_use]
pub fn make_word(i: usize) -> Word {
    let headword = format!("Word{i}");
    Word {
        id: WordId::from(format!("id-{i}").as_str()),
        ipa: format!("/wɜːd{i}/"),
        definition: format!("The {i}th word in the benchmark lexicon"),
        etymology: "From Latin verbum, 'word'".to_string(),
        history: "Coined for load testing and never used again.".to_string(),
        mnemonic: format!("Count to {i} and say it aloud"),
        spelling_tip: "Spell it the way it looks".to_string(),
        examples: vec![
            format!("{headword} appeared in the first sentence."),
            format!("Nobody expected {headword} twice."),
        ],
        theme: Theme::FIXED[i % Theme::FIXED.len()].clone(),
        liked: i % 3 == 0,
        disliked: false,
        favorited: i % 5 == 0,
        audio_url: None,
        word: headword,
    }
}

/// A batch of `n` words starting at index `start`.
#[must_use]
pub fn make_batch(start: usize, n: usize) -> Vec<Word> {
    (start..start + n).map(make_word).collect()
}

/// A bank holding `n` words, filled in batches of ten.
#[must_use]
pub fn make_bank(n: usize) -> WordBank {
    let mut bank = WordBank::new();
    for start in (0..n).step_by(10) {
        bank.add_words(make_batch(start, 10.min(n - start)));
    }
    bank
}
