//! Persistent key-value store backed by SQLite.
//!
//! Backs the offline preload caches. Values are JSON strings; entries may
//! carry a TTL and are expired lazily on read plus in bulk by
//! [`SqliteStore::prune_expired`].

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Current store schema version.
const CURRENT_VERSION: i32 = 1;

/// Key-value entries with optional expiry.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    expires_at TEXT
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL
);
";

/// Errors from the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open the database file
    #[error("failed to open store: {0}")]
    OpenFailed(String),

    /// Schema creation or migration failed
    #[error("store migration failed: {0}")]
    MigrationFailed(String),

    /// A query failed
    #[error("store query failed: {0}")]
    QueryFailed(String),

    /// Filesystem error around the database file
    #[error("store io error: {0}")]
    IoError(String),
}

/// Narrow persistence seam for offline caches.
///
/// Implementations must tolerate being treated as best-effort: callers
/// convert every error into a cache miss.
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value, honoring expiry.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value with an optional time-to-live.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Remove a value.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// SQLite-backed [`KeyValueStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        if version < CURRENT_VERSION {
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
                params![CURRENT_VERSION],
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
            tracing::info!(version = CURRENT_VERSION, "Key-value store initialized");
        }

        Ok(())
    }

    /// Remove every expired entry.
    pub fn prune_expired(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![Utc::now().to_rfc3339()],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        if removed > 0 {
            tracing::debug!(removed, "Pruned expired store entries");
        }
        Ok(removed)
    }

    /// Number of live entries.
    pub fn len(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT value, expires_at FROM kv_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            let expired = DateTime::parse_from_rfc3339(&expires_at)
                .map(|t| t.with_timezone(&Utc) <= Utc::now())
                .unwrap_or(true);
            if expired {
                conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
                    .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
                return Ok(None);
            }
        }

        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl.map(|ttl| {
            (Utc::now() + ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::zero()))
                .to_rfc3339()
        });

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv_entries (key, value, stored_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 stored_at = excluded.stored_at,
                 expires_at = excluded.expires_at",
            params![key, value, Utc::now().to_rfc3339(), expires_at],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}
