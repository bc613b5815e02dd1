//! Project description persisted on disk.
//!
//! A project binds a name to the identity of its record store and to the
//! root directory its data files live under. The description is kept in
//! `.runlog/project.toml` inside the project directory so later sessions
//! and the browsing server can reopen the same stores.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datastore::FileSystemDataStore;
use crate::store::{Store, StoreError, StoreIdentity};

const PROJECT_DIR: &str = ".runlog";
const PROJECT_FILE: &str = "project.toml";

// MARK: - Project Error

/// Errors from loading or saving a project description.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No project found at {0}")]
    NotFound(PathBuf),

    #[error("Malformed project file: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

// MARK: - Project

/// A named project: which record store it uses and where its data lives.
///
/// `record_store` is a [`StoreIdentity`], never a live handle; tables must
/// serialize after the scalar fields, so it is declared last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project name, used as the record group by convention.
    pub name: String,
    /// Directory data paths resolve beneath; joined under the project
    /// directory when relative.
    pub data_root: PathBuf,
    /// Identity of the record store this project is bound to.
    pub record_store: StoreIdentity,
}

impl Project {
    /// Create a project description.
    pub fn new(
        name: impl Into<String>,
        record_store: StoreIdentity,
        data_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            data_root: data_root.into(),
            record_store,
        }
    }

    /// Load the project description from `<dir>/.runlog/project.toml`.
    pub fn load(dir: &Path) -> Result<Self, ProjectError> {
        let file = dir.join(PROJECT_DIR).join(PROJECT_FILE);
        if !file.is_file() {
            return Err(ProjectError::NotFound(dir.to_path_buf()));
        }
        let text = std::fs::read_to_string(&file).map_err(|e| ProjectError::Io(e.to_string()))?;
        toml::from_str(&text).map_err(|e| ProjectError::Parse(e.to_string()))
    }

    /// Write the project description to `<dir>/.runlog/project.toml`,
    /// creating the `.runlog` directory if needed.
    pub fn save(&self, dir: &Path) -> Result<(), ProjectError> {
        let project_dir = dir.join(PROJECT_DIR);
        std::fs::create_dir_all(&project_dir).map_err(|e| ProjectError::Io(e.to_string()))?;
        let text = toml::to_string_pretty(self).map_err(|e| ProjectError::Io(e.to_string()))?;
        std::fs::write(project_dir.join(PROJECT_FILE), text)
            .map_err(|e| ProjectError::Io(e.to_string()))
    }

    /// Reconstruct the record store this project is bound to.
    pub fn open_store(&self) -> Result<Store, StoreError> {
        Store::open(&self.record_store)
    }

    /// Data store rooted at this project's data root, resolved under `base`
    /// when the root is relative.
    pub fn data_store(&self, base: &Path) -> FileSystemDataStore {
        if self.data_root.is_absolute() {
            FileSystemDataStore::new(&self.data_root)
        } else {
            FileSystemDataStore::new(base.join(&self.data_root))
        }
    }
}

// MARK: - Tests
