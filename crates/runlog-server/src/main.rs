//! Runlog Server Binary
//!
//! Standalone server for browsing one runlog project.

use std::path::Path;
use std::sync::Arc;

use runlog_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let project_dir = std::env::var("RUNLOG_PROJECT").unwrap_or_else(|_| ".".to_string());
    let state = Arc::new(AppState::open(Path::new(&project_dir))?);
    let addr = std::env::var("RUNLOG_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    serve(&addr, state).await
}
