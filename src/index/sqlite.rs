//! SQLite-backed duplicate index.
//!
//! Each namespace is a row in `namespace` carrying its sequence counter;
//! records live in `path_record` keyed by `(namespace_id, seq)` so a range
//! scan over one namespace returns paths in append order.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{DuplicateIndex, IndexError, NamespaceHandle, PathRecord};
use crate::scanner::Fingerprint;
use crate::session::store_file::remove_store_files;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS namespace (
    id          INTEGER PRIMARY KEY,
    fingerprint BLOB    NOT NULL UNIQUE,
    sequence    INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS path_record (
    namespace_id INTEGER NOT NULL REFERENCES namespace(id),
    seq          INTEGER NOT NULL,
    path         TEXT    NOT NULL,
    PRIMARY KEY (namespace_id, seq)
) WITHOUT ROWID;
";

/// Duplicate index stored in a single SQLite database file.
pub struct SqliteIndex {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteIndex {
    /// Create a fresh index at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`IndexError::AlreadyExists`] if a file is already present
    /// at `path`, which is then left untouched. Fails with
    /// [`IndexError::Io`] if the file cannot be created (missing parent
    /// directory, permissions) and with [`IndexError::Sqlite`] if the schema
    /// cannot be set up, in which case the new file is removed again.
    pub fn create(path: &Path) -> Result<Self, IndexError> {
        // Claim the path atomically; SQLite then opens the empty file.
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => IndexError::AlreadyExists(path.to_path_buf()),
                _ => IndexError::Io(e),
            })?;

        match Self::initialize(path) {
            Ok(index) => {
                log::debug!("Created duplicate index at {}", path.display());
                Ok(index)
            }
            Err(e) => {
                if let Err(cleanup) = remove_store_files(path) {
                    log::warn!("Failed to remove index store {}: {}", path.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    fn initialize(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        let index = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        index.configure_pragmas()?;
        index.conn.execute_batch(SCHEMA)?;
        Ok(index)
    }

    /// Create an index that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite fails to initialize.
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        let index = Self { conn, path: None };
        index.configure_pragmas()?;
        index.conn.execute_batch(SCHEMA)?;
        Ok(index)
    }

    /// Location of the backing file, `None` for in-memory indexes.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the underlying connection, surfacing any error from SQLite.
    ///
    /// # Errors
    ///
    /// Returns the SQLite error if the connection could not be closed cleanly.
    pub fn close(self) -> Result<(), IndexError> {
        self.conn.close().map_err(|(_, e)| IndexError::Sqlite(e))
    }

    // Scratch store, removed at session end.
    fn configure_pragmas(&self) -> Result<(), IndexError> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    fn namespace_id(conn: &Connection, fingerprint: &Fingerprint) -> Result<i64, IndexError> {
        conn.execute(
            "INSERT OR IGNORE INTO namespace (fingerprint) VALUES (?1)",
            params![&fingerprint.as_bytes()[..]],
        )?;
        let id = conn.query_row(
            "SELECT id FROM namespace WHERE fingerprint = ?1",
            params![&fingerprint.as_bytes()[..]],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn append_record(
        conn: &Connection,
        namespace: NamespaceHandle,
        path: &str,
    ) -> Result<u64, IndexError> {
        let updated = conn.execute(
            "UPDATE namespace SET sequence = sequence + 1 WHERE id = ?1",
            params![namespace.0],
        )?;
        if updated == 0 {
            return Err(IndexError::UnknownNamespace(namespace));
        }
        let seq: i64 = conn.query_row(
            "SELECT sequence FROM namespace WHERE id = ?1",
            params![namespace.0],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO path_record (namespace_id, seq, path) VALUES (?1, ?2, ?3)",
            params![namespace.0, seq, path],
        )?;
        Ok(seq as u64)
    }
}

impl DuplicateIndex for SqliteIndex {
    fn ensure_namespace(&mut self, fingerprint: &Fingerprint) -> Result<NamespaceHandle, IndexError> {
        let tx = self.conn.transaction()?;
        let id = Self::namespace_id(&tx, fingerprint)?;
        tx.commit()?;
        Ok(NamespaceHandle(id))
    }

    fn append(&mut self, namespace: NamespaceHandle, path: &str) -> Result<u64, IndexError> {
        let tx = self.conn.transaction()?;
        let seq = Self::append_record(&tx, namespace, path)?;
        tx.commit()?;
        Ok(seq)
    }

    fn record(&mut self, fingerprint: &Fingerprint, path: &str) -> Result<u64, IndexError> {
        let tx = self.conn.transaction()?;
        let id = Self::namespace_id(&tx, fingerprint)?;
        let seq = Self::append_record(&tx, NamespaceHandle(id), path)?;
        tx.commit()?;
        log::trace!("Recorded {} as #{} under {}", path, seq, fingerprint);
        Ok(seq)
    }

    fn list_records(&self, fingerprint: &Fingerprint) -> Result<Vec<PathRecord>, IndexError> {
        let tx = self.conn.unchecked_transaction()?;
        let records = {
            let id: Option<i64> = tx
                .query_row(
                    "SELECT id FROM namespace WHERE fingerprint = ?1",
                    params![&fingerprint.as_bytes()[..]],
                    |row| row.get(0),
                )
                .optional()?;

            match id {
                None => Vec::new(),
                Some(id) => {
                    let mut stmt = tx.prepare_cached(
                        "SELECT seq, path FROM path_record WHERE namespace_id = ?1 ORDER BY seq",
                    )?;
                    let rows = stmt.query_map(params![id], |row| {
                        Ok(PathRecord {
                            seq: row.get::<_, i64>(0)? as u64,
                            path: row.get(1)?,
                        })
                    })?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            }
        };
        tx.commit()?;
        Ok(records)
    }

    fn namespace_count(&self) -> Result<usize, IndexError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM namespace", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
