//! Snapshot repository contracts plus SQLite and in-memory backends.
//!
//! # Responsibility
//! - Load and save the serialized board document under a fixed key.
//!
//! # Invariants
//! - `save` replaces the previous value atomically (single upsert).
//! - Backends do not interpret the stored text.
//!
//! # See also
//! - `db::migrations` for the `kv_store` schema.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use thiserror::Error;

/// Fixed storage key of the board document.
pub const STORAGE_KEY: &str = "flowboard-storage";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("snapshot backend unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for the persisted board document.
pub trait SnapshotRepository {
    /// Returns the stored document text, if any.
    fn load(&self) -> RepoResult<Option<String>>;
    /// Replaces the stored document text.
    fn save(&self, document: &str, now_ms: i64) -> RepoResult<()>;
}

impl<R: SnapshotRepository + ?Sized> SnapshotRepository for &R {
    fn load(&self) -> RepoResult<Option<String>> {
        (**self).load()
    }

    fn save(&self, document: &str, now_ms: i64) -> RepoResult<()> {
        (**self).save(document, now_ms)
    }
}

/// SQLite-backed repository over the `kv_store` table.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Uses [`STORAGE_KEY`]. `conn` must come from `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, STORAGE_KEY)
    }

    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load(&self) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(
            "event=snapshot_load module=repo status=ok found={} bytes={}",
            value.is_some(),
            value.as_ref().map_or(0, String::len)
        );
        Ok(value)
    }

    fn save(&self, document: &str, now_ms: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key, document, now_ms],
        )?;
        debug!(
            "event=snapshot_save module=repo status=ok bytes={}",
            document.len()
        );
        Ok(())
    }
}

/// Process-local repository for tests and headless runs.
///
/// Writes can be made to fail to exercise persistence warnings.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    value: RefCell<Option<String>>,
    saves: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `document` already stored.
    pub fn with_document(document: impl Into<String>) -> Self {
        let repo = Self::default();
        repo.value.replace(Some(document.into()));
        repo
    }

    pub fn stored(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn load(&self) -> RepoResult<Option<String>> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, document: &str, _now_ms: i64) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::Unavailable("writes disabled".to_string()));
        }
        self.value.replace(Some(document.to_string()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySnapshotRepository, SnapshotRepository, SqliteSnapshotRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_repository_upserts_single_key() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteSnapshotRepository::new(&conn);
        assert_eq!(repo.load().unwrap(), None);

        repo.save("{\"v\":1}", 10).unwrap();
        repo.save("{\"v\":2}", 20).unwrap();

        assert_eq!(repo.load().unwrap().as_deref(), Some("{\"v\":2}"));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn in_memory_repository_can_refuse_writes() {
        let repo = InMemorySnapshotRepository::new();
        repo.set_fail_writes(true);
        assert!(repo.save("x", 0).is_err());
        assert_eq!(repo.stored(), None);

        repo.set_fail_writes(false);
        repo.save("x", 0).unwrap();
        assert_eq!(repo.save_count(), 1);
    }
}
