//! Runlog Server - Record Browsing API
//!
//! HTTP JSON API for browsing the provenance records, data files, and diffs
//! of one runlog project.

pub mod content;
pub mod http;

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use runlog_core::{FileSystemDataStore, Project, RecordStore, Store};

/// Shared application state
///
/// Everything the handlers touch is injected here, so tests can wire a state
/// around an in-memory store and a temporary data root.
pub struct AppState {
    pub project: Project,
    pub store: Store,
    pub data: FileSystemDataStore,
}

impl AppState {
    pub fn new(project: Project, store: Store, data: FileSystemDataStore) -> Self {
        Self {
            project,
            store,
            data,
        }
    }

    /// Load the project description from `dir` and open the stores it is
    /// bound to.
    pub fn open(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let project = Project::load(dir)?;
        let store = project.open_store()?;
        let data = project.data_store(dir);
        tracing::info!(
            "Opened project {} ({} backend)",
            project.name,
            store.backend_name()
        );

        Ok(Self {
            project,
            store,
            data,
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Project overview
        .route("/", get(http::project_overview))
        // Record endpoints
        .route("/records", get(http::list_records))
        .route("/records", post(http::save_record))
        .route("/records/{label}", get(http::get_record))
        .route("/records/{label}", delete(http::delete_record))
        // Data file endpoints
        .route("/records/{label}/datafile", get(http::show_datafile))
        .route("/records/{label}/image", get(http::show_image))
        // Diff endpoint
        .route("/records/{label}/diff", get(http::show_diff))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Runlog server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
