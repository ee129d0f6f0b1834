//! Health and API document tests

use super::{build_test_router, get, TestAppState};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = build_test_router(TestAppState::new());

    let response = get(&app, "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], json!("healthy"));
}

#[tokio::test]
async fn test_ready_reflects_store() {
    let mut state = TestAppState::new();
    let app = build_test_router(state.clone());
    assert_eq!(get(&app, "/ready", None).await.status, StatusCode::OK);

    state.ready = false;
    let app = build_test_router(state);
    assert_eq!(
        get(&app, "/ready", None).await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = build_test_router(TestAppState::new());

    let response = get(&app, "/api-docs/openapi.json", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/properties/search"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = build_test_router(TestAppState::new());

    let response = get(&app, "/health", None).await;

    assert!(response.headers.contains_key("x-request-id"));
}
