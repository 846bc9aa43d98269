// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use bazaar_core::BazaarError;
use thiserror::Error;
use tracing::debug;

use crate::migrations;

/// Path value selecting a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Errors raised inside a connection closure.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored fields are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration failed: {0}")]
    Migration(String),
}

/// Convert a tokio-rusqlite error into [`BazaarError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<DbError>) -> BazaarError {
    BazaarError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection.
///
/// Cloning shares the same background thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` and runs migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, BazaarError> {
        let in_memory = path == IN_MEMORY;
        if !in_memory
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BazaarError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = if in_memory {
            tokio_rusqlite::Connection::open_in_memory().await
        } else {
            tokio_rusqlite::Connection::open(path).await
        }
        .map_err(|e| BazaarError::Storage {
            source: Box::new(e),
        })?;

        let use_wal = wal_mode && !in_memory;
        conn.call(move |conn| -> Result<(), DbError> {
            if use_wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal = use_wal, "database opened");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), BazaarError> {
        self.conn
            .call(|conn| -> Result<(), DbError> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Runs a trivial statement to prove the connection is alive.
    pub async fn ping(&self) -> Result<(), BazaarError> {
        self.conn
            .call(|conn| -> Result<(), DbError> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn opens_in_memory() {
        let db = Database::open(IN_MEMORY, true).await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/bazaar.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.checkpoint().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn reopening_keeps_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();
        Database::open(path, false).await.unwrap();
        let db = Database::open(path, false).await.unwrap();
        db.ping().await.unwrap();
    }
}
