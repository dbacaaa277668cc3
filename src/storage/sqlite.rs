//! SQLite key/value bridge.
//!
//! Stores every key in a single `kv` table. Connections come from an r2d2
//! pool; the bridge always answers synchronously.

use super::StorageBridge;
use crate::constants::{BRIDGE_CONNECT_TIMEOUT_SECS, BRIDGE_POOL_SIZE};
use crate::errors::{AppResult, StorageError};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use std::task::Poll;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const CREATE_KV_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Primary bridge backed by an SQLite database file.
pub struct SqliteBridge {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteBridge {
    /// Opens or creates the database and its `kv` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the table cannot be created.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening bridge database at: {:?}", db_path);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(StorageError::Backend {
                    backend: "sqlite".to_string(),
                    message: format!("directory {} does not exist", parent.display()),
                }
                .into());
            }
        }
        Self::with_manager(SqliteConnectionManager::file(db_path), BRIDGE_POOL_SIZE)
    }

    /// Opens a private in-memory database; used by tests.
    pub fn open_in_memory() -> AppResult<Self> {
        // A single connection so every checkout sees the same in-memory database.
        Self::with_manager(SqliteConnectionManager::memory(), 1)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32) -> AppResult<Self> {
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(BRIDGE_CONNECT_TIMEOUT_SECS))
            .build(manager)
            .map_err(StorageError::Pool)?;

        let bridge = SqliteBridge { pool };
        bridge
            .conn()?
            .execute_batch(CREATE_KV_TABLE)
            .map_err(StorageError::Sqlite)?;

        info!("Bridge database opened");
        Ok(bridge)
    }

    fn conn(&self) -> AppResult<PooledConnection> {
        self.pool.get().map_err(|e| StorageError::Pool(e).into())
    }
}

impl StorageBridge for SqliteBridge {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn get(&self, key: &str) -> AppResult<Poll<Option<String>>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(StorageError::Sqlite)?;
        Ok(Poll::Ready(value))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<Poll<()>> {
        self.conn()?
            .execute(
                r#"
                INSERT INTO kv (key, value, updated_at)
                VALUES (?1, ?2, CURRENT_TIMESTAMP)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP
                "#,
                params![key, value],
            )
            .map_err(StorageError::Sqlite)?;
        debug!("Bridge stored '{}'", key);
        Ok(Poll::Ready(()))
    }

    fn remove(&self, key: &str) -> AppResult<Poll<()>> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(StorageError::Sqlite)?;
        Ok(Poll::Ready(()))
    }
}
