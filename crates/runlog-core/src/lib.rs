//! runlog-core: provenance tracking for computational runs
//!
//! This crate provides the core functionality for the runlog provenance
//! tracker: the record model, pluggable record stores, and access to the
//! data files records point at.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        runlog-core                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  record        │ Provenance record model                    │
//! │  store         │ RecordStore contract, in-memory backend,   │
//! │                │ Store wrapper and StoreIdentity            │
//! │  redb_store    │ Embedded key-value backend (redb)          │
//! │  sqlite_store  │ Project-scoped relational backend (SQLite) │
//! │  datastore     │ Data-file access and classification        │
//! │  project       │ On-disk project description                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use runlog_core::{Record, RecordStore, Store};
//!
//! let store = Store::redb("runs.redb")?;
//! store.save(&Record::new("20260314-092653", "hydro").with_reason("resolution study"))?;
//! for record in store.list(&[])? {
//!     println!("{}: {}", record.label, record.outcome);
//! }
//! ```

pub mod datastore;
pub mod project;
pub mod record;
pub mod redb_store;
pub mod sqlite_store;
pub mod store;

pub use datastore::{image_content_type, DataError, FileKind, FileSystemDataStore};
pub use project::{Project, ProjectError};
pub use record::{DataKey, Record};
pub use redb_store::RedbRecordStore;
pub use sqlite_store::SqliteRecordStore;
pub use store::{InMemoryRecordStore, RecordStore, Store, StoreError, StoreIdentity};
