//! Key-value blob storage contracts and implementations.
//!
//! # Responsibility
//! - Define the narrow `get/set/remove` boundary the persistence adapter uses.
//! - Provide an in-memory backend and a SQLite-backed backend.
//!
//! # Invariants
//! - `set` fully replaces any previous value for the key.
//! - `remove` on a missing key is a no-op, not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type KvResult<T> = Result<T, KvError>;

/// Storage failure raised by a key-value backend.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "key-value storage error: {err}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Flat string key-value store holding serialized blobs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&mut self, key: &str) -> KvResult<()>;
}

/// Process-local store; contents vanish with the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed store over the `kv_entries` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> KvResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection previously returned by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
