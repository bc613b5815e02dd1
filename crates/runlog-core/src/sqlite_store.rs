//! Project-scoped SQLite backend.
//!
//! Records are stored as serde_json payloads with denormalized `project` and
//! `grp` columns for filtering. One database file can hold many projects;
//! each store handle is bound to a single project at construction and every
//! operation acts within that scope.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::record::Record;
use crate::store::{RecordStore, StoreError, StoreIdentity};

// MARK: - SQLite Record Store

/// Record store backed by a SQLite database, scoped to one project.
///
/// Two stores on the same database file with different project names are
/// fully isolated from each other.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    project: String,
}

impl SqliteRecordStore {
    /// Open the database at `path` (creating it if absent), scoped to
    /// `project`.
    pub fn open<P: AsRef<Path>>(path: P, project: &str) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|e| StoreError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            project: project.to_string(),
        })
    }

    /// Create an in-memory store scoped to `project` (useful for testing).
    /// Its identity reopens as a fresh empty database.
    pub fn in_memory(project: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
            project: project.to_string(),
        })
    }

    /// Initialize the database schema.
    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                project TEXT NOT NULL,
                label TEXT NOT NULL,
                grp TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (project, label)
            );

            CREATE INDEX IF NOT EXISTS idx_records_project_grp
                ON records(project, grp);
            "#,
        )
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    /// The project this store is scoped to.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Capture this store's identity for later reopening.
    pub fn identity(&self) -> StoreIdentity {
        StoreIdentity::Sqlite {
            path: self.path.clone(),
            project: self.project.clone(),
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn save(&self, record: &Record) -> Result<(), StoreError> {
        if record.label.is_empty() {
            return Err(StoreError::EmptyLabel);
        }
        let payload =
            serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO records (project, label, grp, timestamp, payload)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                self.project,
                record.label,
                record.group,
                record.timestamp.to_rfc3339(),
                payload,
            ],
        )
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    fn get(&self, label: &str) -> Result<Record, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let payload: String = conn
            .query_row(
                "SELECT payload FROM records WHERE project = ?1 AND label = ?2",
                params![self.project, label],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(label.to_string()),
                other => StoreError::Storage(other.to_string()),
            })?;

        serde_json::from_str(&payload).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn list(&self, groups: &[String]) -> Result<Vec<Record>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut sql = String::from("SELECT payload FROM records WHERE project = ?1");
        let mut sql_params: Vec<&dyn rusqlite::ToSql> = vec![&self.project];
        if !groups.is_empty() {
            let placeholders: Vec<String> =
                (0..groups.len()).map(|i| format!("?{}", i + 2)).collect();
            sql.push_str(&format!(" AND grp IN ({})", placeholders.join(", ")));
            for group in groups {
                sql_params.push(group);
            }
        }

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(sql_params.as_slice(), |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut records = Vec::new();
        for payload in rows {
            let payload = payload.map_err(|e| StoreError::Storage(e.to_string()))?;
            let record: Record = serde_json::from_str(&payload)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    fn delete(&self, label: &str) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let affected = conn
            .execute(
                "DELETE FROM records WHERE project = ?1 AND label = ?2",
                params![self.project, label],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(StoreError::NotFound(label.to_string()));
        }
        Ok(())
    }
}

// MARK: - Tests
