// crates/nft-sub-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Merchant Store
// Description: Durable MerchantStore backed by SQLite WAL.
// Purpose: Persist merchant records in a KV-shaped schema with a member set.
// Dependencies: nft-sub-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`MerchantStore`] using `SQLite`. The
//! schema mirrors the KV layout of the service: one `kv_entries` row per
//! merchant keyed by a namespaced string, plus a `kv_set_members` table
//! holding the global merchant-id set used for enumeration. Loads fail
//! closed on corrupted rows; bulk enumeration silently drops them instead.
//! Invariants:
//! - `created_at` is preserved across overwrites of the same key.
//! - Unknown schema versions are rejected with a version-mismatch error.
//! - Connection access is serialized through a mutex.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use nft_sub_core::MerchantDraft;
use nft_sub_core::MerchantId;
use nft_sub_core::MerchantRecord;
use nft_sub_core::MerchantStore;
use nft_sub_core::MerchantUpdate;
use nft_sub_core::SharedClock;
use nft_sub_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Key prefix namespacing merchant record entries.
const MERCHANT_KEY_PREFIX: &str = "merchant:";
/// Set key holding every known merchant id.
const MERCHANT_SET_KEY: &str = "merchants:all";

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

/// Configuration for the `SQLite` merchant store.
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

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the provided path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
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
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption (undecodable record payload).
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed merchant store with WAL support.
///
/// # Invariants
/// - Mutations run inside transactions; record writes and set membership
///   stay consistent.
/// - `SQLite` connection access is serialized through a mutex.
pub struct SqliteMerchantStore {
    /// Shared connection guarded by a mutex.
    connection: Mutex<Connection>,
    /// Timestamp source for record stamps.
    clock: SharedClock,
}

impl std::fmt::Debug for SqliteMerchantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMerchantStore").finish_non_exhaustive()
    }
}

impl SqliteMerchantStore {
    /// Opens an `SQLite`-backed merchant store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig, clock: SharedClock) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            clock,
        })
    }

    /// Returns the connection guard, mapping poisoned locks to I/O errors.
    fn guard(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))
    }

    /// Creates or overwrites a merchant record inside one transaction.
    fn create_inner(&self, draft: MerchantDraft) -> Result<MerchantRecord, SqliteStoreError> {
        let now = self.clock.now_utc();
        let key = merchant_key(&draft.merchant_id);
        let mut guard = self.guard()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        // A corrupt prior row loses its creation stamp; the overwrite wins.
        let created_at = read_entry(&tx, &key)?
            .and_then(|bytes| decode_record(&key, &bytes).ok())
            .map_or(now, |existing| existing.created_at);
        let record = draft.into_record(created_at, now);
        let value_json = encode_record(&record)?;
        tx.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value_json, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value_json, record.updated_at.unix_timestamp()],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute(
            "INSERT OR IGNORE INTO kv_set_members (set_key, member) VALUES (?1, ?2)",
            params![MERCHANT_SET_KEY, record.merchant_id.as_str()],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(record)
    }

    /// Loads a record by merchant id, failing closed on corrupt payloads.
    fn get_inner(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, SqliteStoreError> {
        let key = merchant_key(id);
        let guard = self.guard()?;
        match read_entry(&guard, &key)? {
            None => Ok(None),
            Some(bytes) => decode_record(&key, &bytes).map(Some),
        }
    }

    /// Lists all records reachable through the member set.
    fn get_all_inner(&self) -> Result<Vec<MerchantRecord>, SqliteStoreError> {
        let guard = self.guard()?;
        let mut statement = guard
            .prepare("SELECT member FROM kv_set_members WHERE set_key = ?1 ORDER BY member")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let members = statement
            .query_map(params![MERCHANT_SET_KEY], |row| row.get::<_, String>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::with_capacity(members.len());
        for member in members {
            let key = merchant_key(&MerchantId::new(member));
            // Members whose entry is missing or undecodable drop out of the
            // listing rather than failing the whole call.
            if let Ok(Some(bytes)) = read_entry(&guard, &key)
                && let Ok(record) = decode_record(&key, &bytes)
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Merges a partial update into an existing record transactionally.
    fn update_inner(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, SqliteStoreError> {
        let now = self.clock.now_utc();
        let key = merchant_key(id);
        let mut guard = self.guard()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let Some(bytes) = read_entry(&tx, &key)? else {
            return Ok(None);
        };
        let existing = decode_record(&key, &bytes)?;
        let merged = update.merged_into(&existing, now);
        let value_json = encode_record(&merged)?;
        tx.execute(
            "UPDATE kv_entries SET value_json = ?2, updated_at = ?3 WHERE key = ?1",
            params![key, value_json, merged.updated_at.unix_timestamp()],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(Some(merged))
    }

    /// Removes a record and its member-set entry transactionally.
    fn delete_inner(&self, id: &MerchantId) -> Result<bool, SqliteStoreError> {
        let key = merchant_key(id);
        let mut guard = self.guard()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let removed = tx
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute(
            "DELETE FROM kv_set_members WHERE set_key = ?1 AND member = ?2",
            params![MERCHANT_SET_KEY, id.as_str()],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(removed > 0)
    }

    /// Verifies the store can execute a simple SQL statement.
    fn readiness_inner(&self) -> Result<(), SqliteStoreError> {
        let guard = self.guard()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }
}

impl MerchantStore for SqliteMerchantStore {
    fn create_merchant(&self, draft: MerchantDraft) -> Result<MerchantRecord, StoreError> {
        self.create_inner(draft).map_err(StoreError::from)
    }

    fn get_merchant(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError> {
        self.get_inner(id).map_err(StoreError::from)
    }

    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError> {
        self.get_all_inner().map_err(StoreError::from)
    }

    fn update_merchant(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError> {
        self.update_inner(id, update).map_err(StoreError::from)
    }

    fn delete_merchant(&self, id: &MerchantId) -> Result<bool, StoreError> {
        self.delete_inner(id).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.readiness_inner().map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the namespaced KV key for a merchant id.
fn merchant_key(id: &MerchantId) -> String {
    format!("{MERCHANT_KEY_PREFIX}{id}")
}

/// Serializes a record into canonical JSON bytes.
fn encode_record(record: &MerchantRecord) -> Result<Vec<u8>, SqliteStoreError> {
    serde_json::to_vec(record).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Deserializes JSON bytes into a record, failing closed on corruption.
fn decode_record(key: &str, bytes: &[u8]) -> Result<MerchantRecord, SqliteStoreError> {
    serde_json::from_slice(bytes)
        .map_err(|err| SqliteStoreError::Corrupt(format!("undecodable entry {key}: {err}")))
}

/// Reads a raw KV entry by key.
fn read_entry(connection: &Connection, key: &str) -> Result<Option<Vec<u8>>, SqliteStoreError> {
    connection
        .query_row("SELECT value_json FROM kv_entries WHERE key = ?1", params![key], |row| {
            row.get::<_, Vec<u8>>(0)
        })
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Rejects store paths that cannot hold a database file.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path is empty".to_string()));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(format!(
            "store path is a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Creates the parent directory for the database file when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    Ok(())
}

/// Opens a connection with the configured flags and pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
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
                "CREATE TABLE IF NOT EXISTS kv_entries (
                    key TEXT NOT NULL PRIMARY KEY,
                    value_json BLOB NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS kv_set_members (
                    set_key TEXT NOT NULL,
                    member TEXT NOT NULL,
                    PRIMARY KEY (set_key, member)
                );
                CREATE INDEX IF NOT EXISTS idx_kv_set_members_set_key
                    ON kv_set_members (set_key);",
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
