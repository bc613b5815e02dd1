//! Provenance record types.
//!
//! A [`Record`] captures the metadata of one tracked computational run:
//! why it was launched, the parameters it ran with, the data files it
//! produced, and the version of the code that produced them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// MARK: - Data Key

/// Reference to a data file produced by a run.
///
/// The path is relative to the project's data root; content is resolved
/// through [`FileSystemDataStore`](crate::datastore::FileSystemDataStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataKey {
    /// Path relative to the data root.
    pub path: String,
    /// Content digest at recording time, if one was computed.
    pub digest: Option<String>,
    /// File size in bytes at recording time.
    pub size: Option<u64>,
}

impl DataKey {
    /// Create a data key for a relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: None,
            size: None,
        }
    }

    /// Set the content digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Set the file size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

// MARK: - Record

/// A labeled unit of provenance metadata for one tracked run.
///
/// Records are immutable once saved: stores overwrite on a duplicate label
/// rather than keeping versions. The store carries `parameters`,
/// `output_data`, `version` and `diff` opaquely and never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within a store; the primary key.
    pub label: String,

    /// Coarse category used to filter listings (usually the project name).
    pub group: String,

    /// When the run was launched.
    pub timestamp: DateTime<Utc>,

    /// Why the run was launched.
    pub reason: String,

    /// Free-text summary of the result, filled in after the run.
    pub outcome: String,

    /// Launch parameters, carried opaquely.
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Data files the run produced.
    pub output_data: Vec<DataKey>,

    /// Recorded version of the script/code that ran.
    pub version: Option<String>,

    /// Diff of the working copy against the recorded version, captured at
    /// launch time. Opaque here; the browser only shows it.
    pub diff: Option<String>,

    /// Free-form tags.
    pub tags: Vec<String>,

    /// Wall-clock duration in seconds.
    pub duration: Option<f64>,
}

impl Record {
    /// Create a record with the given label and group, timestamped now.
    pub fn new(label: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            group: group.into(),
            timestamp: Utc::now(),
            reason: String::new(),
            outcome: String::new(),
            parameters: BTreeMap::new(),
            output_data: Vec::new(),
            version: None,
            diff: None,
            tags: Vec::new(),
            duration: None,
        }
    }

    /// Default label for a run launched at `at`: `YYYYMMDD-HHMMSS`.
    pub fn timestamp_label(at: DateTime<Utc>) -> String {
        at.format("%Y%m%d-%H%M%S").to_string()
    }

    /// Set the launch reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Set the outcome summary.
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = outcome.into();
        self
    }

    /// Set the launch parameters.
    pub fn with_parameters(mut self, parameters: BTreeMap<String, serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the recorded code version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a working-copy diff.
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }

    /// Set the run duration in seconds.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add an output data file.
    pub fn with_output(mut self, key: DataKey) -> Self {
        self.output_data.push(key);
        self
    }
}

// MARK: - Tests
