//! Export and import of word bank documents.
//!
//! Exports are pretty-printed JSON in the same shape as the stored record.
//! Import is deliberately loose: the only structural requirement is a
//! `words` array. Individual word fields are decoded leniently (missing
//! text fields default, a scalar `examples` becomes a one-item list) and a
//! missing `seenWords` is read as empty.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use crate::error::{LexiconError, Result};
use crate::types::StoredWordBank;

/// Render `bank` as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns [`LexiconError::Serialization`] if encoding fails.
pub fn export_text(bank: &StoredWordBank) -> Result<String> {
    serde_json::to_string_pretty(bank).map_err(|e| LexiconError::Serialization(e.to_string()))
}

/// Parse an exported (or hand-written) document.
///
/// # Errors
///
/// Returns [`LexiconError::Import`] if the text is not JSON, has no `words`
/// array, or a word entry has the wrong shape entirely.
pub fn import_text(text: &str) -> Result<StoredWordBank> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| LexiconError::import(format!("invalid JSON: {e}")))?;

    match value.get("words") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(LexiconError::import("`words` must be an array")),
        None => return Err(LexiconError::import("document has no `words` array")),
    }

    let bank: StoredWordBank = serde_json::from_value(value)
        .map_err(|e| LexiconError::import(format!("malformed word bank: {e}")))?;

    info!(
        words = bank.words.len(),
        seen = bank.seen_words.len(),
        "Word bank document imported"
    );
    Ok(bank)
}

/// Download file name for an export taken at `now`.
#[must_use]
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("lexicon-luminary-{}.json", now.timestamp_millis())
}
