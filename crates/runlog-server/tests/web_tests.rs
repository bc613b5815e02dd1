//! Record browsing API integration tests
//!
//! Handlers are exercised directly against a state wired around an
//! in-memory store and a temporary data root; the assembled router is
//! driven end to end through tower's `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tower::ServiceExt;

use runlog_core::{FileSystemDataStore, Project, Record, RecordStore, Store, StoreIdentity};
use runlog_server::content::DataFileView;
use runlog_server::http::{
    delete_record, get_record, list_records, project_overview, save_record, show_datafile,
    show_diff, show_image, DataFileQuery, ImageQuery, ListQuery,
};
use runlog_server::{create_router, AppState};

fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();

    let store = Store::in_memory();
    store
        .save(&Record::new("record1", "TestProject").with_reason("first run"))
        .unwrap();
    store
        .save(&Record::new("record2", "TestProject").with_reason("second run"))
        .unwrap();
    store
        .save(&Record::new("record3", "OtherProject").with_reason("unrelated run"))
        .unwrap();

    let project = Project::new("TestProject", StoreIdentity::Memory, dir.path().to_path_buf());
    let data = FileSystemDataStore::new(dir.path());
    let state = Arc::new(AppState::new(project, store, data));
    (dir, state)
}

// === Overview ===

#[tokio::test]
async fn test_root_shows_project_name_and_records() {
    let (_dir, state) = test_state();

    let Json(overview) = project_overview(State(state)).await.unwrap();
    assert_eq!(overview.project_name, "TestProject");
    assert_eq!(overview.backend, "memory");
    assert_eq!(overview.records.len(), 3);
}

// === Record Listing ===

#[tokio::test]
async fn test_list_records_unfiltered() {
    let (_dir, state) = test_state();

    let Json(response) = list_records(State(state), Query(ListQuery { groups: None }))
        .await
        .unwrap();
    assert_eq!(response.count, 3);
    assert_eq!(response.records.len(), 3);
}

#[tokio::test]
async fn test_list_records_filtered_by_group() {
    let (_dir, state) = test_state();

    let Json(filtered) = list_records(
        State(state.clone()),
        Query(ListQuery {
            groups: Some("TestProject".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(filtered.count, 2);
    assert!(filtered.records.iter().all(|r| r.group == "TestProject"));

    let Json(both) = list_records(
        State(state.clone()),
        Query(ListQuery {
            groups: Some("TestProject,OtherProject".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(both.count, 3);

    let Json(none) = list_records(
        State(state),
        Query(ListQuery {
            groups: Some("NoSuchGroup".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(none.count, 0);
}

// === Record Detail ===

#[tokio::test]
async fn test_get_record_detail() {
    let (_dir, state) = test_state();

    let Json(record) = get_record(State(state), Path("record1".to_string()))
        .await
        .unwrap();
    assert_eq!(record.label, "record1");
    assert_eq!(record.reason, "first run");
}

#[tokio::test]
async fn test_get_nonexistent_record_is_404() {
    let (_dir, state) = test_state();

    let err = get_record(State(state), Path("nonexistent".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

// === Saving and Deleting ===

#[tokio::test]
async fn test_save_record() {
    let (_dir, state) = test_state();

    let record = Record::new("record4", "TestProject").with_outcome("new run");
    let Json(response) = save_record(State(state.clone()), Json(record))
        .await
        .unwrap();
    assert_eq!(response["success"], true);
    assert_eq!(response["label"], "record4");

    let Json(overview) = project_overview(State(state)).await.unwrap();
    assert_eq!(overview.records.len(), 4);
}

#[tokio::test]
async fn test_save_overwrites_same_label() {
    let (_dir, state) = test_state();

    let record = Record::new("record1", "TestProject").with_outcome("rerun");
    save_record(State(state.clone()), Json(record)).await.unwrap();

    let Json(overview) = project_overview(State(state.clone())).await.unwrap();
    assert_eq!(overview.records.len(), 3);

    let Json(detail) = get_record(State(state), Path("record1".to_string()))
        .await
        .unwrap();
    assert_eq!(detail.outcome, "rerun");
}

#[tokio::test]
async fn test_save_empty_label_is_400() {
    let (_dir, state) = test_state();

    let err = save_record(State(state), Json(Record::new("", "TestProject")))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_record() {
    let (_dir, state) = test_state();

    delete_record(State(state.clone()), Path("record2".to_string()))
        .await
        .unwrap();

    let err = get_record(State(state.clone()), Path("record2".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);

    let err = delete_record(State(state), Path("record2".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

// === Data File Views ===

#[tokio::test]
async fn test_csv_datafile_is_parsed_into_rows() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("data.csv"), "a,b,c\n1,2,3\n").unwrap();

    let Json(view) = show_datafile(
        State(state),
        Path("record1".to_string()),
        Query(DataFileQuery {
            path: "data.csv".to_string(),
            max_length: None,
        }),
    )
    .await
    .unwrap();

    match view {
        DataFileView::DelimitedText { rows, .. } => {
            assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
        }
        other => panic!("expected delimited text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_text_datafile_respects_max_length() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("notes.txt"), "0123456789").unwrap();

    let Json(view) = show_datafile(
        State(state),
        Path("record1".to_string()),
        Query(DataFileQuery {
            path: "notes.txt".to_string(),
            max_length: Some(4),
        }),
    )
    .await
    .unwrap();

    match view {
        DataFileView::PlainText { content, truncated } => {
            assert_eq!(content, "0123");
            assert!(truncated);
        }
        other => panic!("expected plain text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_image_datafile_points_at_image_route() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("plot.png"), [0x89, 0x50, 0x4E, 0x47]).unwrap();

    let Json(view) = show_datafile(
        State(state),
        Path("record1".to_string()),
        Query(DataFileQuery {
            path: "plot.png".to_string(),
            max_length: None,
        }),
    )
    .await
    .unwrap();

    match view {
        DataFileView::Image { image_url } => {
            assert_eq!(image_url, "/records/record1/image?path=plot.png");
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_file_type_cannot_be_displayed() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("report.doc"), b"\x00\x01").unwrap();

    let Json(view) = show_datafile(
        State(state),
        Path("record1".to_string()),
        Query(DataFileQuery {
            path: "report.doc".to_string(),
            max_length: None,
        }),
    )
    .await
    .unwrap();

    match view {
        DataFileView::Binary { message } => {
            assert_eq!(message, "Can't display this file type.");
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_datafile_reports_file_not_found() {
    let (_dir, state) = test_state();

    let Json(view) = show_datafile(
        State(state),
        Path("record1".to_string()),
        Query(DataFileQuery {
            path: "non_existent_file.txt".to_string(),
            max_length: None,
        }),
    )
    .await
    .unwrap();

    match view {
        DataFileView::Missing { message } => {
            assert_eq!(message, "File not found.");
        }
        other => panic!("expected missing, got {:?}", other),
    }
}

#[tokio::test]
async fn test_datafile_for_unknown_record_is_404() {
    let (_dir, state) = test_state();

    let err = show_datafile(
        State(state),
        Path("nonexistent".to_string()),
        Query(DataFileQuery {
            path: "data.csv".to_string(),
            max_length: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

// === Image Serving ===

#[tokio::test]
async fn test_image_served_with_content_type() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("plot.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

    let response = match show_image(
        State(state),
        Path("record1".to_string()),
        Query(ImageQuery {
            path: "plot.jpg".to_string(),
        }),
    )
    .await
    {
        Ok(response) => response.into_response(),
        Err((status, message)) => panic!("unexpected error: {} {}", status, message),
    };

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn test_missing_image_is_404() {
    let (_dir, state) = test_state();

    let err = match show_image(
        State(state),
        Path("record1".to_string()),
        Query(ImageQuery {
            path: "plot.png".to_string(),
        }),
    )
    .await
    {
        Err(err) => err,
        Ok(_) => panic!("expected an error for a missing image"),
    };
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_image_path_is_415() {
    let (dir, state) = test_state();
    std::fs::write(dir.path().join("notes.txt"), "text").unwrap();

    let err = match show_image(
        State(state),
        Path("record1".to_string()),
        Query(ImageQuery {
            path: "notes.txt".to_string(),
        }),
    )
    .await
    {
        Err(err) => err,
        Ok(_) => panic!("expected an error for a non-image path"),
    };
    assert_eq!(err.0, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// === Diff View ===

#[tokio::test]
async fn test_diff_view_shows_recorded_diff() {
    let (_dir, state) = test_state();
    state
        .store
        .save(
            &Record::new("record4", "TestProject")
                .with_version("abc123")
                .with_diff("--- a/run.py\n+++ b/run.py\n"),
        )
        .unwrap();

    let Json(diff) = show_diff(State(state), Path("record4".to_string()))
        .await
        .unwrap();
    assert_eq!(diff.label, "record4");
    assert_eq!(diff.version.as_deref(), Some("abc123"));
    assert!(diff.diff.as_deref().unwrap().contains("+++ b/run.py"));
}

#[tokio::test]
async fn test_diff_view_exposes_absence() {
    let (_dir, state) = test_state();

    let Json(diff) = show_diff(State(state), Path("record1".to_string()))
        .await
        .unwrap();
    assert!(diff.version.is_none());
    assert!(diff.diff.is_none());
}

// === Router ===

#[tokio::test]
async fn test_router_serves_overview_at_root() {
    let (_dir, state) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let overview: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(overview["project_name"], "TestProject");
    assert_eq!(overview["backend"], "memory");
}

#[tokio::test]
async fn test_router_resolves_record_label() {
    let (_dir, state) = test_state();
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/records/record1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record["label"], "record1");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/records/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_router_saves_posted_record() {
    let (_dir, state) = test_state();
    let app = create_router(state.clone());

    let body = serde_json::to_string(&Record::new("record4", "TestProject")).unwrap();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.store.list(&[]).unwrap().len(), 4);
}

#[tokio::test]
async fn test_router_rejects_unknown_path() {
    let (_dir, state) = test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/no/such/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
