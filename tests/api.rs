//! HTTP boundary tests.
//!
//! These exercise the router without touching any embedding or chat
//! provider: validation failures and status reads short-circuit before the
//! first network call.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use eventease_backend::core::{AppConfig, AppPaths};
use eventease_backend::server::router::router;
use eventease_backend::state::AppState;

fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
    let paths = Arc::new(AppPaths::with_data_dir(dir.path().join("data")));
    let mut config = AppConfig::default();
    config.embeddings.use_remote = false;
    AppState::with_parts(paths, config).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_service_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "EventEase");
}

#[tokio::test]
async fn status_reports_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let response = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["documents"], 0);
    assert_eq!(json["conversations"], 0);
}

#[tokio::test]
async fn empty_query_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let response = app
        .oneshot(
            Request::post("/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Query cannot be empty.");
}

#[tokio::test]
async fn chat_without_credentials_is_a_server_error() {
    // The store is empty so retrieval short-circuits; the chat provider then
    // rejects the call because no api key is configured.
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let response = app
        .oneshot(
            Request::post("/chat")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query": "when does it start?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn ingest_without_a_file_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let body = concat!(
        "--BOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"other\"\r\n",
        "\r\n",
        "not a file\r\n",
        "--BOUNDARY--\r\n"
    );
    let response = app
        .oneshot(
            Request::post("/ingest")
                .header("content-type", "multipart/form-data; boundary=BOUNDARY")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ingest_rejects_path_traversal_names() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(test_state(&dir));

    let body = concat!(
        "--BOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"../escape.txt\"\r\n",
        "\r\n",
        "content\r\n",
        "--BOUNDARY--\r\n"
    );
    let response = app
        .oneshot(
            Request::post("/ingest")
                .header("content-type", "multipart/form-data; boundary=BOUNDARY")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
