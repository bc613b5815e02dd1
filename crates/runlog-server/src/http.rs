//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use runlog_core::{image_content_type, DataError, Record, RecordStore, StoreError};

use crate::content::{render_datafile, DataFileView, DEFAULT_MAX_LENGTH};
use crate::AppState;

/// Summary of a record for listing
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub label: String,
    pub group: String,
    pub timestamp: String,
    pub reason: String,
    pub outcome: String,
}

impl RecordSummary {
    fn from_record(record: &Record) -> Self {
        Self {
            label: record.label.clone(),
            group: record.group.clone(),
            timestamp: record.timestamp.to_rfc3339(),
            reason: record.reason.clone(),
            outcome: record.outcome.clone(),
        }
    }
}

/// Response for the project overview
#[derive(Debug, Serialize)]
pub struct ProjectOverview {
    pub project_name: String,
    pub backend: String,
    pub records: Vec<RecordSummary>,
}

/// Response for record listings
#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub records: Vec<RecordSummary>,
    pub count: usize,
}

/// Response for the diff view
#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub label: String,
    pub version: Option<String>,
    pub diff: Option<String>,
}

/// Translate a store error into a response
fn store_error_response(err: StoreError) -> (StatusCode, String) {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::EmptyLabel => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

// ============================================================================
// Overview
// ============================================================================

/// Get the project overview: name, backend, and every record
pub async fn project_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProjectOverview>, (StatusCode, String)> {
    let records = state.store.list(&[]).map_err(store_error_response)?;

    Ok(Json(ProjectOverview {
        project_name: state.project.name.clone(),
        backend: state.store.backend_name().to_string(),
        records: records.iter().map(RecordSummary::from_record).collect(),
    }))
}

// ============================================================================
// Record Endpoints
// ============================================================================

/// Query for record listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Comma-separated group names; absent means no filter.
    pub groups: Option<String>,
}

/// List records, optionally filtered by group
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RecordListResponse>, (StatusCode, String)> {
    let groups: Vec<String> = query
        .groups
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .collect();

    let records = state.store.list(&groups).map_err(store_error_response)?;
    let count = records.len();

    Ok(Json(RecordListResponse {
        records: records.iter().map(RecordSummary::from_record).collect(),
        count,
    }))
}

/// Save a record, overwriting any record with the same label
pub async fn save_record(
    State(state): State<Arc<AppState>>,
    Json(record): Json<Record>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.store.save(&record).map_err(store_error_response)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "label": record.label
    })))
}

/// Get a record's full detail
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<Record>, (StatusCode, String)> {
    let record = state.store.get(&label).map_err(store_error_response)?;
    Ok(Json(record))
}

/// Delete a record
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.store.delete(&label).map_err(store_error_response)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "label": label
    })))
}

// ============================================================================
// Data File Endpoints
// ============================================================================

/// Query for the datafile view
#[derive(Debug, Deserialize)]
pub struct DataFileQuery {
    pub path: String,
    pub max_length: Option<usize>,
}

/// Show a record's data file, classified by type
pub async fn show_datafile(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    Query(query): Query<DataFileQuery>,
) -> Result<Json<DataFileView>, (StatusCode, String)> {
    // The record must exist even though content is resolved by path
    state.store.get(&label).map_err(store_error_response)?;

    let max_length = query.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
    let view = render_datafile(&label, &query.path, &state.data, max_length)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(view))
}

/// Query for the image view
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub path: String,
}

/// Serve a record's image file with its content type
pub async fn show_image(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.get(&label).map_err(store_error_response)?;

    let content_type = image_content_type(&query.path).ok_or((
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        format!("Not an image: {}", query.path),
    ))?;

    let content = state
        .data
        .get_content(&query.path, usize::MAX)
        .map_err(|e| match e {
            DataError::FileNotFound(_) | DataError::InvalidPath(_) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    Ok(([(header::CONTENT_TYPE, content_type)], content))
}

// ============================================================================
// Diff Endpoint
// ============================================================================

/// Show the version and diff recorded with a record
pub async fn show_diff(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
) -> Result<Json<DiffResponse>, (StatusCode, String)> {
    let record = state.store.get(&label).map_err(store_error_response)?;

    Ok(Json(DiffResponse {
        label: record.label,
        version: record.version,
        diff: record.diff,
    }))
}
