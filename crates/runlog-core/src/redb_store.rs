//! Embedded key-value backend on redb.
//!
//! Records live in a single database file as serde_json values keyed by
//! label. This is the zero-administration durable backend: one file, no
//! server process, transactional writes.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};

use crate::record::Record;
use crate::store::{group_matches, RecordStore, StoreError, StoreIdentity};

const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

// MARK: - Redb Record Store

/// Record store backed by an embedded redb database file.
///
/// The handle is process-exclusive: redb holds a file lock, so a second
/// process opening the same path fails at `open` rather than corrupting the
/// database. The lock and the file handle are released when the store is
/// dropped, on every exit path.
pub struct RedbRecordStore {
    db: Database,
    path: PathBuf,
}

impl RedbRecordStore {
    /// Open the database at `path`, creating it if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(|e| StoreError::Storage(e.to_string()))?;
        // Ensure the records table exists so a fresh database is readable
        let txn = db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            txn.open_table(RECORDS)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        txn.commit().map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Self { db, path })
    }

    /// Capture this store's identity for later reopening.
    pub fn identity(&self) -> StoreIdentity {
        StoreIdentity::Redb {
            path: self.path.clone(),
        }
    }
}

impl RecordStore for RedbRecordStore {
    fn backend_name(&self) -> &'static str {
        "redb"
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        if record.label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        let payload =
            serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        {
            let mut table = txn
                .open_table(RECORDS)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            table
                .insert(record.label.as_str(), payload.as_slice())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        txn.commit().map_err(|e| StoreError::Storage(e.to_string()))
    }

    fn get(&self, label: &str) -> Result<Record, StoreError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let table = txn
            .open_table(RECORDS)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        match table
            .get(label)
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            Some(guard) => serde_json::from_slice(guard.value())
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Err(StoreError::NotFound(label.to_string())),
        }
    }

    fn list(&self, groups: &[String]) -> Result<Vec<Record>, StoreError> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let table = txn
            .open_table(RECORDS)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut records = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| StoreError::Storage(e.to_string()))?;
            let record: Record = serde_json::from_slice(value.value())
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if group_matches(groups, &record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn delete(&self, label: &str) -> Result<(), StoreError> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let removed = {
            let mut table = txn
                .open_table(RECORDS)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            // Bind before the tail expression so the guard drops ahead of `table`
            let prior = table
                .remove(label)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            prior.is_some()
        };
        if !removed {
            return Err(StoreError::NotFound(label.to_string()));
        }
        txn.commit().map_err(|e| StoreError::Storage(e.to_string()))
    }
}

// MARK: - Tests
