//! The record store contract and its backends.
//!
//! A record store keeps [`Record`]s keyed by label. Three backends implement
//! the same contract: an in-memory map for tests and development, an embedded
//! key-value database ([`RedbRecordStore`]), and a project-scoped SQLite
//! database ([`SqliteRecordStore`]). [`Store`] wraps the three behind one
//! type and round-trips through [`StoreIdentity`] so a store can be reopened
//! later without ever serializing a live handle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::redb_store::RedbRecordStore;
use crate::sqlite_store::SqliteRecordStore;

// MARK: - Store Error

/// Errors from a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record label must not be empty")]
    EmptyLabel,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// MARK: - Store Identity

/// Serializable description of a store: which backend, and where.
///
/// A live store handle owns open files and locks and is never serialized.
/// Capture its identity instead and reconstruct the handle later with
/// [`Store::open`]. Durable backends reopen onto the same persisted records;
/// `Memory` reopens empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreIdentity {
    /// Non-durable in-memory store.
    Memory,
    /// Embedded key-value database at `path`.
    Redb { path: PathBuf },
    /// SQLite database at `path`, scoped to `project`.
    Sqlite { path: PathBuf, project: String },
}

// MARK: - Record Store Trait

/// The trait that all record storage backends implement.
pub trait RecordStore: Send + Sync {
    /// Short name of the backend, for display.
    fn backend_name(&self) -> &'static str;

    /// Persist a record under its label, overwriting any prior record with
    /// the same label. Rejects an empty label.
    fn save(&self, record: &Record) -> Result<(), StoreError>;

    /// Get the record saved under `label`.
    fn get(&self, label: &str) -> Result<Record, StoreError>;

    /// List records. An empty `groups` slice means no filter: every record
    /// is returned. Otherwise only records whose group is in `groups`.
    /// No ordering is guaranteed.
    fn list(&self, groups: &[String]) -> Result<Vec<Record>, StoreError>;

    /// Delete the record saved under `label`. Deleting an absent label is
    /// an error, not a no-op.
    fn delete(&self, label: &str) -> Result<(), StoreError>;
}

/// Group membership check shared by the backends' `list` implementations.
pub(crate) fn group_matches(groups: &[String], record: &Record) -> bool {
    groups.is_empty() || groups.iter().any(|g| *g == record.group)
}

// MARK: - In-Memory Record Store

/// In-memory record store for testing and development.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<BTreeMap<String, Record>>,
}

impl InMemoryRecordStore {
    /// Create a new in-memory record store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Get the number of records in the store.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        if record.label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        records.insert(record.label.clone(), record.clone());
        Ok(())
    }

    fn get(&self, label: &str) -> Result<Record, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        records
            .get(label)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(label.to_string()))
    }

    fn list(&self, groups: &[String]) -> Result<Vec<Record>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(records
            .values()
            .filter(|r| group_matches(groups, r))
            .cloned()
            .collect())
    }

    fn delete(&self, label: &str) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        records
            .remove(label)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(label.to_string()))
    }
}

// MARK: - Store (Wrapper)

/// Record store that can use any of the three backends.
pub enum Store {
    /// In-memory store for testing and development.
    Memory(InMemoryRecordStore),
    /// Embedded key-value store.
    Redb(RedbRecordStore),
    /// Project-scoped SQLite store.
    Sqlite(SqliteRecordStore),
}

impl Store {
    /// Create a new in-memory store.
    pub fn in_memory() -> Self {
        Store::Memory(InMemoryRecordStore::new())
    }

    /// Open (creating if absent) an embedded key-value store.
    pub fn redb<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Store::Redb(RedbRecordStore::open(path)?))
    }

    /// Open (creating if absent) a SQLite store scoped to `project`.
    pub fn sqlite<P: AsRef<Path>>(path: P, project: &str) -> Result<Self, StoreError> {
        Ok(Store::Sqlite(SqliteRecordStore::open(path, project)?))
    }

    /// Reconstruct a store handle from a captured identity.
    ///
    /// Durable backends observe every record saved through any earlier
    /// handle with the same identity.
    pub fn open(identity: &StoreIdentity) -> Result<Self, StoreError> {
        match identity {
            StoreIdentity::Memory => Ok(Store::in_memory()),
            StoreIdentity::Redb { path } => Store::redb(path),
            StoreIdentity::Sqlite { path, project } => Store::sqlite(path, project),
        }
    }

    /// Capture this store's identity.
    pub fn identity(&self) -> StoreIdentity {
        match self {
            Store::Memory(_) => StoreIdentity::Memory,
            Store::Redb(store) => store.identity(),
            Store::Sqlite(store) => store.identity(),
        }
    }
}

impl RecordStore for Store {
    fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(store) => store.backend_name(),
            Store::Redb(store) => store.backend_name(),
            Store::Sqlite(store) => store.backend_name(),
        }
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        match self {
            Store::Memory(store) => store.save(record),
            Store::Redb(store) => store.save(record),
            Store::Sqlite(store) => store.save(record),
        }
    }

    fn get(&self, label: &str) -> Result<Record, StoreError> {
        match self {
            Store::Memory(store) => store.get(label),
            Store::Redb(store) => store.get(label),
            Store::Sqlite(store) => store.get(label),
        }
    }

    fn list(&self, groups: &[String]) -> Result<Vec<Record>, StoreError> {
        match self {
            Store::Memory(store) => store.list(groups),
            Store::Redb(store) => store.list(groups),
            Store::Sqlite(store) => store.list(groups),
        }
    }

    fn delete(&self, label: &str) -> Result<(), StoreError> {
        match self {
            Store::Memory(store) => store.delete(label),
            Store::Redb(store) => store.delete(label),
            Store::Sqlite(store) => store.delete(label),
        }
    }
}

// MARK: - Tests
