//! # Lexicon Core Library
//!
//! The stateful heart of Lexicon Luminary: a learner's accumulated
//! vocabulary and the etymology quest game that feeds it.
//!
//! - [`bank`]: the [`WordBank`], append-only words plus the seen-headword
//!   set used to steer generation away from repeats
//! - [`quest`]: the [`QuestGame`] round state machine, with per-slot
//!   tickets so a late reply never overwrites a newer round
//! - [`persistence`]: one keyed record in SQLite or a JSON file
//! - [`transfer`]: export / import documents
//! - [`config`]: `lexicon.toml`
//!
//! Nothing in this crate talks to the network; word and riddle generation
//! live in `lexicon-llm`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bank;
pub mod config;
pub mod error;
pub mod persistence;
pub mod quest;
pub mod transfer;
pub mod types;

pub use bank::{BankStats, WordBank};
pub use config::LexiconConfig;
pub use error::LexiconError;
pub use persistence::{JsonFileStore, SqliteStore, WordBankStore};
pub use quest::{EtymologyQuest, QuestGame, QuestTicket};
pub use types::*;
