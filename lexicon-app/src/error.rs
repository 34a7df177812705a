//! Session error types.

use lexicon_core::LexiconError;
use lexicon_llm::GenerationError;
use thiserror::Error;

/// Errors surfaced to the user by a [`crate::Session`].
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage, import or configuration failure.
    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    /// The model could not produce words or a riddle.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The provider needs a credential and none was found.
    #[error("API key is not set: export {env} before starting")]
    MissingApiKey {
        /// Environment variable that should hold the key.
        env: String,
    },

    /// No word in the bank has this id.
    #[error("No word with id '{0}'")]
    UnknownWord(String),

    /// A quest answer was submitted with no riddle on screen.
    #[error("No etymology quest is awaiting an answer")]
    NoActiveQuest,
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, AppError>;
