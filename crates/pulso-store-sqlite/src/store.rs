// crates/pulso-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Durable Store
// Description: Durable store backed by SQLite WAL.
// Purpose: Persist queue records and cache entries with integrity hashes.
// Dependencies: pulso-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`DurableStore`] using `SQLite`. Each
//! entry is persisted as a canonical JSON snapshot together with a digest of
//! those bytes; loads recompute the digest and fail closed on mismatch, so a
//! torn row surfaces as corruption instead of a half-valid record. A store
//! that cannot be opened reports unavailability, which callers surface
//! condition, they never swallow it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use pulso_core::CacheEntry;
use pulso_core::DEFAULT_HASH_ALGORITHM;
use pulso_core::DurableStore;
use pulso_core::HashAlgorithm;
use pulso_core::RecordId;
use pulso_core::StoreError;
use pulso_core::SubmissionRecord;
use pulso_core::Timestamp;
use pulso_core::canonical_json_bytes;
use pulso_core::hash_bytes;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` durable store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw record payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Database could not be opened or the host blocks persistent storage.
    #[error("sqlite store unavailable: {0}")]
    Unavailable(String),
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Unavailable(message) => Self::Unavailable(message),
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed durable store with WAL support.
///
/// # Invariants
/// - Entry loads verify stored hashes before deserialization.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Debug)]
pub struct SqliteStore {
    /// Shared connection guarded by a mutex.
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed durable store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Unavailable`] when the database cannot be
    /// opened and other [`SqliteStoreError`] variants when initialization
    /// fails.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Runs a closure with the locked connection.
    fn with_connection<T>(
        &self,
        body: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        body(&guard)
    }
}

// ============================================================================
// SECTION: Durable Store Implementation
// ============================================================================

impl DurableStore for SqliteStore {
    fn put_record(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let snapshot = prepare_snapshot(record)?;
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT OR REPLACE INTO queue_records (record_id, record_json, record_hash, \
                     hash_algorithm, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record.record_id.as_str(),
                        snapshot.bytes,
                        snapshot.hash_value,
                        snapshot.hash_algorithm,
                        timestamp_millis_hint(record.created_at),
                    ],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<SubmissionRecord>, StoreError> {
        let payload = self.with_connection(|connection| {
            fetch_payload(
                connection,
                "SELECT record_json, record_hash, hash_algorithm FROM queue_records WHERE \
                 record_id = ?1",
                id.as_str(),
            )
        })?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        let record: SubmissionRecord = decode_payload(&payload, id.as_str())?;
        if record.record_id != *id {
            return Err(StoreError::Invalid(
                "record_id mismatch between key and payload".to_string(),
            ));
        }
        Ok(Some(record))
    }

    fn delete_record(&self, id: &RecordId) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection
                .execute("DELETE FROM queue_records WHERE record_id = ?1", params![id.as_str()])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn list_pending(&self, limit: usize) -> Result<Vec<SubmissionRecord>, StoreError> {
        let limit = i64::try_from(limit)
            .map_err(|_| StoreError::Invalid("listing limit too large".to_string()))?;
        let payloads = self.with_connection(|connection| {
            let mut stmt = connection
                .prepare(
                    "SELECT record_id, record_json, record_hash, hash_algorithm FROM \
                     queue_records ORDER BY rowid ASC LIMIT ?1",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    let key: String = row.get(0)?;
                    let bytes: Vec<u8> = row.get(1)?;
                    let hash_value: String = row.get(2)?;
                    let hash_algorithm: String = row.get(3)?;
                    Ok((key, StoredPayload {
                        bytes,
                        hash_value,
                        hash_algorithm,
                    }))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut payloads = Vec::new();
            for row in rows {
                payloads.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
            }
            Ok(payloads)
        })?;
        let mut records = Vec::with_capacity(payloads.len());
        for (key, payload) in payloads {
            let record: SubmissionRecord = decode_payload(&payload, &key)?;
            if record.record_id.as_str() != key {
                return Err(StoreError::Invalid(
                    "record_id mismatch between key and payload".to_string(),
                ));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn put_cache(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let snapshot = prepare_snapshot(entry)?;
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT OR REPLACE INTO cache_entries (key, entry_json, entry_hash, \
                     hash_algorithm, saved_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        entry.key,
                        snapshot.bytes,
                        snapshot.hash_value,
                        snapshot.hash_algorithm,
                        timestamp_millis_hint(entry.saved_at),
                    ],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get_cache(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let payload = self.with_connection(|connection| {
            fetch_payload(
                connection,
                "SELECT entry_json, entry_hash, hash_algorithm FROM cache_entries WHERE key = ?1",
                key,
            )
        })?;
        let Some(payload) = payload else {
            return Ok(None);
        };
        let entry: CacheEntry = decode_payload(&payload, key)?;
        if entry.key != key {
            return Err(StoreError::Invalid("key mismatch between key and payload".to_string()));
        }
        Ok(Some(entry))
    }

    fn delete_cache(&self, key: &str) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection
                .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Canonical bytes and digest for one stored entry.
#[derive(Debug)]
struct StoredPayload {
    /// Canonical JSON bytes.
    bytes: Vec<u8>,
    /// Stored digest value.
    hash_value: String,
    /// Stored digest algorithm label.
    hash_algorithm: String,
}

/// Serializes and hashes a value for persistence.
fn prepare_snapshot<T: serde::Serialize>(value: &T) -> Result<StoredPayload, StoreError> {
    let bytes = canonical_json_bytes(value)
        .map_err(|err| StoreError::Serialization(err.to_string()))?;
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
    Ok(StoredPayload {
        bytes,
        hash_value: digest.value,
        hash_algorithm: digest.algorithm.label().to_string(),
    })
}

/// Fetches one stored payload by key.
fn fetch_payload(
    connection: &Connection,
    sql: &str,
    key: &str,
) -> Result<Option<StoredPayload>, SqliteStoreError> {
    connection
        .query_row(sql, params![key], |row| {
            let bytes: Vec<u8> = row.get(0)?;
            let hash_value: String = row.get(1)?;
            let hash_algorithm: String = row.get(2)?;
            Ok(StoredPayload {
                bytes,
                hash_value,
                hash_algorithm,
            })
        })
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Verifies the stored digest and deserializes the payload.
fn decode_payload<T: DeserializeOwned>(
    payload: &StoredPayload,
    key: &str,
) -> Result<T, StoreError> {
    let Some(algorithm) = HashAlgorithm::from_label(&payload.hash_algorithm) else {
        return Err(StoreError::Corrupt(format!(
            "unknown hash algorithm for entry {key}: {}",
            payload.hash_algorithm
        )));
    };
    let expected = hash_bytes(algorithm, &payload.bytes);
    if expected.value != payload.hash_value {
        return Err(StoreError::Corrupt(format!("hash mismatch for entry {key}")));
    }
    serde_json::from_slice(&payload.bytes).map_err(|err| StoreError::Invalid(err.to_string()))
}

/// Returns a sortable millisecond hint for a timestamp column.
fn timestamp_millis_hint(timestamp: Timestamp) -> i64 {
    match timestamp {
        Timestamp::UnixMillis(value) => value,
        Timestamp::Logical(value) => i64::try_from(value).unwrap_or(i64::MAX),
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Ensures the parent directory of the store path exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Unavailable(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS queue_records (
                    record_id TEXT NOT NULL PRIMARY KEY,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_queue_records_created_at
                    ON queue_records (created_at);
                CREATE TABLE IF NOT EXISTS cache_entries (
                    key TEXT NOT NULL PRIMARY KEY,
                    entry_json BLOB NOT NULL,
                    entry_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
