//! # lexicon-app: Session Layer for Lexicon Luminary
//!
//! Glues the word bank and quest game from `lexicon-core` to the generator
//! and speaker from `lexicon-llm`, behind one [`Session`] object. The
//! `lexicon` binary is a thin command-line front end over it.
//!
//! ```text
//!   lexicon (CLI) ──▶ Session ──▶ WordBank / QuestGame   (lexicon-core)
//!                        │──────▶ WordBankStore          (sqlite | json)
//!                        └──────▶ WordGenerator, Speaker (lexicon-llm)
//! ```

pub mod error;
pub mod session;

pub use error::AppError;
pub use session::{AnswerOutcome, PendingQuest, Session, resolve_api_key};
