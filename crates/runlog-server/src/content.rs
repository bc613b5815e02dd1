//! Datafile view models.
//!
//! Translates a record's data-file reference into something a browser can
//! show: parsed rows for delimited text, verbatim text, a pointer to the
//! image route, or a can't-display message. A file that does not exist is a
//! user-visible state of the view, not a propagated error.

use runlog_core::{DataError, FileKind, FileSystemDataStore};
use serde::Serialize;

/// Byte cap applied when the datafile view is fetched without an explicit
/// limit.
pub const DEFAULT_MAX_LENGTH: usize = 10_000;

const CANT_DISPLAY: &str = "Can't display this file type.";
const FILE_NOT_FOUND: &str = "File not found.";

/// What the datafile view shows for one path.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DataFileView {
    /// Delimited text parsed into rows.
    DelimitedText { rows: Vec<Vec<String>>, truncated: bool },
    /// Plain text shown verbatim.
    PlainText { content: String, truncated: bool },
    /// An image, served separately with its content type.
    Image { image_url: String },
    /// A file type the browser cannot display inline.
    Binary { message: String },
    /// The referenced file does not exist.
    Missing { message: String },
}

/// Render the datafile view for `path`, reading at most `max_length` bytes.
///
/// Only the text kinds read content here; images are fetched through their
/// own route and binary files are never read at all.
pub fn render_datafile(
    label: &str,
    path: &str,
    data: &FileSystemDataStore,
    max_length: usize,
) -> Result<DataFileView, DataError> {
    match FileKind::from_path(path) {
        FileKind::Image => Ok(DataFileView::Image {
            image_url: format!("/records/{}/image?path={}", label, path),
        }),
        FileKind::Binary => Ok(DataFileView::Binary {
            message: CANT_DISPLAY.to_string(),
        }),
        FileKind::DelimitedText => match read_capped(data, path, max_length)? {
            Some((content, truncated)) => Ok(DataFileView::DelimitedText {
                rows: delimited_rows(&content, delimiter_for(path)),
                truncated,
            }),
            None => Ok(missing()),
        },
        FileKind::PlainText => match read_capped(data, path, max_length)? {
            Some((content, truncated)) => Ok(DataFileView::PlainText {
                content: String::from_utf8_lossy(&content).into_owned(),
                truncated,
            }),
            None => Ok(missing()),
        },
    }
}

fn missing() -> DataFileView {
    DataFileView::Missing {
        message: FILE_NOT_FOUND.to_string(),
    }
}

/// Read up to `max_length` bytes plus whether anything was cut off; `None`
/// when the path resolves to nothing under the data root.
fn read_capped(
    data: &FileSystemDataStore,
    path: &str,
    max_length: usize,
) -> Result<Option<(Vec<u8>, bool)>, DataError> {
    // One byte of lookahead distinguishes a cut file from an exact fit
    match data.get_content(path, max_length.saturating_add(1)) {
        Ok(mut content) => {
            let truncated = content.len() > max_length;
            content.truncate(max_length);
            Ok(Some((content, truncated)))
        }
        Err(DataError::FileNotFound(_) | DataError::InvalidPath(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn delimiter_for(path: &str) -> u8 {
    if path.to_lowercase().ends_with(".tsv") {
        b'\t'
    } else {
        b','
    }
}

/// Parse delimited content into rows. The content may be cut mid-line by the
/// byte cap, so ragged and malformed trailing rows are tolerated.
fn delimited_rows(content: &[u8], delimiter: u8) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content)
        .records()
        .filter_map(|r| r.ok())
        .map(|record| record.iter().map(|field| field.to_string()).collect())
        .collect()
}

// MARK: - Tests
