//! Access to the data files records point at.
//!
//! Records reference their output files by paths relative to a project data
//! root. [`FileSystemDataStore`] resolves those references and reads capped
//! amounts of content; [`FileKind`] classifies a path by extension so a
//! frontend can decide how to present it.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// MARK: - Data Error

/// Errors that can occur while resolving or reading data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid data path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(String),
}

// MARK: - File Kind

/// Presentation class of a data file, decided purely from its extension.
///
/// This is a display-dispatch decision, never persisted with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    /// Delimited text (csv, tsv): parse into rows for display.
    DelimitedText,
    /// Plain text: show verbatim.
    PlainText,
    /// Raster or vector image: serve bytes with an image content type.
    Image,
    /// Anything else: cannot be displayed inline.
    Binary,
}

impl FileKind {
    /// Classify a path by its file extension.
    pub fn from_path(path: &str) -> Self {
        let extension = path
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" => FileKind::DelimitedText,
            "txt" | "log" | "md" | "json" | "toml" | "yaml" | "yml" => FileKind::PlainText,
            "png" | "jpg" | "jpeg" | "gif" | "svg" => FileKind::Image,
            _ => FileKind::Binary,
        }
    }
}

/// Content type for an image path, `None` for non-image extensions.
pub fn image_content_type(path: &str) -> Option<&'static str> {
    let extension = path
        .rsplit('.')
        .next()
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

// MARK: - File System Data Store

/// Resolves record-relative data paths beneath a root directory.
#[derive(Debug, Clone)]
pub struct FileSystemDataStore {
    root: PathBuf,
}

impl FileSystemDataStore {
    /// Create a data store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory data paths resolve beneath.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a record-relative path beneath the root. Absolute paths and
    /// paths with `..` components must not escape the root and are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, DataError> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(DataError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Whether `path` resolves to an existing file.
    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Read at most `max_length` bytes of the file at `path`.
    pub fn get_content(&self, path: &str, max_length: usize) -> Result<Vec<u8>, DataError> {
        let full = self.resolve(path)?;
        let file = std::fs::File::open(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::FileNotFound(path.to_string()),
            _ => DataError::Io(e.to_string()),
        })?;

        let mut content = Vec::new();
        file.take(max_length as u64)
            .read_to_end(&mut content)
            .map_err(|e| DataError::Io(e.to_string()))?;
        Ok(content)
    }
}

// MARK: - Tests
