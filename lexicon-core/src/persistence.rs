//! Durable storage for the word bank.
//!
//! The whole bank lives in one keyed record holding the JSON document
//! `{ "words": [...], "seenWords": [...] }`. Two backends implement
//! [`WordBankStore`]:
//!
//! - [`SqliteStore`] keeps records in a small key/value table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS records (
//!     key        TEXT PRIMARY KEY,
//!     value      TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! - [`JsonFileStore`] writes the document to a single file, replacing it
//!   atomically through a temp file in the same directory.
//!
//! A record that exists but cannot be parsed is treated as "no saved data"
//! and logged; it never blocks startup. Write failures are returned to the
//! caller.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{LexiconError, Result};
use crate::types::StoredWordBank;

/// Key the word bank record is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "lexicon-luminary-wordbank";

/// A durable home for exactly one word bank record.
pub trait WordBankStore {
    /// Overwrite the stored record with `bank`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    fn save(&self, bank: &StoredWordBank) -> Result<()>;

    /// Read the stored record.
    ///
    /// Returns `None` when nothing is stored or the stored text does not
    /// parse.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails to read.
    fn load(&self) -> Result<Option<StoredWordBank>>;

    /// Remove the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to delete.
    fn clear(&self) -> Result<()>;
}

/// Open the store selected by `config.backend`.
///
/// # Errors
///
/// Returns [`LexiconError::Config`] for an unknown backend name, or the
/// backend's own error if it cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Box<dyn WordBankStore>> {
    match config.backend.as_str() {
        "sqlite" => Ok(Box::new(SqliteStore::open(&config.path, config)?)),
        "json" => Ok(Box::new(JsonFileStore::new(&config.path))),
        other => Err(LexiconError::Config(format!(
            "unknown persistence backend '{other}' (expected 'sqlite' or 'json')"
        ))),
    }
}

fn encode(bank: &StoredWordBank) -> Result<String> {
    serde_json::to_string(bank).map_err(|e| LexiconError::Serialization(e.to_string()))
}

/// Parse stored text, logging rather than failing on garbage.
fn decode_or_discard(raw: &str, source: &str) -> Option<StoredWordBank> {
    match serde_json::from_str(raw) {
        Ok(bank) => Some(bank),
        Err(e) => {
            warn!(source, error = %e, "Stored word bank is unreadable; starting empty");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS records (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Word bank record kept in an SQLite key/value table.
pub struct SqliteStore {
    conn: Connection,
    key: String,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if missing; WAL mode is enabled when
    /// `config.wal_mode` is set.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;
        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            key = %config.storage_key,
            "Word bank store opened"
        );

        Ok(Self {
            conn,
            key: config.storage_key.clone(),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Database`] on SQLite failures.
    pub fn open_in_memory(key: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            key: key.into(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Write a raw string under the store's key, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Database`] on SQLite failures.
    pub fn put_raw(&self, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO records (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![self.key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl WordBankStore for SqliteStore {
    fn save(&self, bank: &StoredWordBank) -> Result<()> {
        let start = Instant::now();
        let json = encode(bank)?;
        self.put_raw(&json)?;
        debug!(
            key = %self.key,
            words = bank.words.len(),
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved word bank"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredWordBank>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            debug!(key = %self.key, "No saved word bank");
            return Ok(None);
        };
        Ok(decode_or_discard(&raw, "sqlite"))
    }

    fn clear(&self) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM records WHERE key = ?1", params![self.key])?;
        info!(key = %self.key, removed, "Word bank record cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Word bank record kept as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store writing to `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordBankStore for JsonFileStore {
    fn save(&self, bank: &StoredWordBank) -> Result<()> {
        let json = encode(bank)?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| LexiconError::Persistence(e.to_string()))?;

        debug!(path = %self.path.display(), words = bank.words.len(), "Saved word bank");
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredWordBank>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(decode_or_discard(&raw, "json"))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Word bank file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Theme, Word, WordId};

    fn sample_bank() -> StoredWordBank {
        let word: Word = serde_json::from_value(serde_json::json!({
            "id": "w-1",
            "word": "Ephemeral",
            "definition": "lasting a very short time",
            "examples": ["Fame is ephemeral."],
            "theme": "Literary",
            "favorited": true
        }))
        .expect("word");
        StoredWordBank {
            words: vec![word],
            seen_words: vec!["ephemeral".into()],
        }
    }

    #[test]
    fn sqlite_round_trip_save_load() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        let bank = sample_bank();

        store.save(&bank).expect("save");
        let loaded = store.load().expect("load").expect("Some");

        assert_eq!(loaded, bank);
        assert_eq!(loaded.words[0].theme, Theme::Literary);
        assert_eq!(loaded.words[0].id, WordId::from("w-1"));
    }

    #[test]
    fn sqlite_load_nonexistent_returns_none() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn sqlite_save_overwrites() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        store.save(&sample_bank()).expect("save1");

        let mut bigger = sample_bank();
        bigger.words.push(bigger.words[0].clone());
        store.save(&bigger).expect("save2");

        let loaded = store.load().expect("load").expect("Some");
        assert_eq!(loaded.words.len(), 2, "Should reflect the second save");
    }

    #[test]
    fn sqlite_unparseable_record_loads_as_none() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        store.put_raw("{not json").expect("put");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn sqlite_record_with_null_fields_survives_load() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        store
            .put_raw(
                r#"{"words": [{"id": "1", "word": "lucid", "ipa": null, "mnemonic": null,
                               "favorited": null, "examples": null}],
                    "seenWords": ["lucid"]}"#,
            )
            .expect("put");
        let loaded = store.load().expect("load").expect("record kept");
        assert_eq!(loaded.words.len(), 1);
        assert_eq!(loaded.words[0].word, "lucid");
        assert!(loaded.words[0].mnemonic.is_empty());
        assert!(!loaded.words[0].favorited);
    }

    #[test]
    fn sqlite_clear_removes_record() {
        let store = SqliteStore::open_in_memory(DEFAULT_STORAGE_KEY).expect("open");
        store.save(&sample_bank()).expect("save");
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn sqlite_keys_are_isolated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("bank.db");
        let mut config = PersistenceConfig::default();

        let first = SqliteStore::open(&db, &config).expect("open");
        first.save(&sample_bank()).expect("save");

        config.storage_key = "other-profile".into();
        let second = SqliteStore::open(&db, &config).expect("open second");
        assert!(second.load().expect("load").is_none());
        assert!(first.load().expect("load").is_some());
    }

    #[test]
    fn json_file_round_trip_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("nested").join("bank.json"));

        assert!(store.load().expect("load").is_none());
        store.save(&sample_bank()).expect("save");
        assert_eq!(store.load().expect("load"), Some(sample_bank()));

        store.clear().expect("clear");
        assert!(!store.path().exists());
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn json_file_garbage_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bank.json");
        std::fs::write(&path, "definitely not json").expect("write");
        let store = JsonFileStore::new(&path);
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn open_store_rejects_unknown_backend() {
        let config = PersistenceConfig {
            backend: "redis".into(),
            ..PersistenceConfig::default()
        };
        let Err(err) = open_store(&config) else {
            panic!("unknown backend should fail");
        };
        assert!(matches!(err, LexiconError::Config(_)));
    }
}
