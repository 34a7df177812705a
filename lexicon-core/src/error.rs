//! Error types for the Lexicon core library.

use thiserror::Error;

/// Top-level error type for word bank, quest and persistence operations.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The store could not write or remove the record.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An imported document was rejected.
    #[error("Failed to import word bank: {reason}")]
    Import {
        /// Why the document was rejected.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LexiconError {
    /// Shorthand for an [`LexiconError::Import`] rejection.
    pub(crate) fn import(reason: impl Into<String>) -> Self {
        Self::Import {
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LexiconError>;
