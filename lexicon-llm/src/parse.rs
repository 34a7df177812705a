//! Tolerant decoding of structured model replies.
//!
//! Models are asked for raw JSON but often wrap it in a Markdown code fence
//! (```` ```json ... ``` ````) or add a sentence before or after. Decoding
//! goes in three steps:
//!
//! 1. trim, then strip one leading fence line and one trailing fence;
//! 2. try to parse what is left;
//! 3. failing that, try the outermost `[...]` or `{...}` span.
//!
//! Anything still unparseable is a [`GenerationError::ParseError`].

use serde::de::DeserializeOwned;

use crate::error::GenerationError;

/// Which top-level JSON shape a reply should have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Self::Array => ('[', ']'),
            Self::Object => ('{', '}'),
        }
    }
}

/// Remove a surrounding Markdown code fence, if present.
///
/// The opening fence may carry a language tag (`json`, `JSON`, anything up
/// to the end of its line).
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // Single-line reply: ```json [ ... ]```
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Decode a model reply into `T`, expecting the given top-level `shape`.
///
/// # Errors
///
/// Returns [`GenerationError::ParseError`] if no candidate span parses.
pub fn decode_reply<T: DeserializeOwned>(text: &str, shape: Shape) -> Result<T, GenerationError> {
    let body = strip_code_fence(text);

    let first_err = match serde_json::from_str::<T>(body) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let (open, close) = shape.delimiters();
    if let (Some(start), Some(end)) = (body.find(open), body.rfind(close)) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<T>(&body[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(GenerationError::ParseError(format!(
        "{first_err}; raw text: '{}'",
        preview(text)
    )))
}

/// First 200 characters of `text`, for error messages.
fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
