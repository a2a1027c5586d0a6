// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle for the cache database.
//!
//! All reads and writes go through the single tokio-rusqlite background
//! thread owned by [`Database`]. Do not open a second connection for writes.

use std::path::Path;

use chainscope_core::ChainscopeError;
use tracing::debug;

use crate::migrations::run_migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;";

/// Converts a tokio-rusqlite error into [`ChainscopeError::Cache`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChainscopeError {
    ChainscopeError::Cache {
        source: Box::new(e),
    }
}

/// Handle to the migrated SQLite cache file.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: &str) -> Result<Self, ChainscopeError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ChainscopeError::Cache {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ChainscopeError::Cache {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), ChainscopeError> { run_migrations(conn) })
            .await
            .map_err(|e| ChainscopeError::Cache {
                source: Box::new(e),
            })?;

        debug!(path, "cache database opened");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main file holds every committed write.
    pub async fn checkpoint(&self) -> Result<(), ChainscopeError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
