mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp};

#[tokio::test]
async fn healthy_when_sheet_reachable_and_config_clean() {
    let app = TestApp::new();

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["sheets"]["status"], "healthy");
    assert_eq!(body["checks"]["configuration"]["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unreachable_sheet_is_503() {
    let app = TestApp::new();
    app.sheet.fail_next(3, 500, "backend error");

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["sheets"]["status"], "unhealthy");
    assert!(!body.to_string().contains("backend error"));
}

#[tokio::test]
async fn config_warnings_degrade_but_still_200() {
    let app = TestApp::with_warnings(vec![
        "GOOGLE_SHEETS_SPREADSHEET_ID looks too short".to_string(),
    ]);

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["configuration"]["status"], "degraded");
    assert!(body["checks"]["configuration"]["message"]
        .as_str()
        .unwrap()
        .contains("too short"));
}

#[tokio::test]
async fn health_check_never_touches_rows() {
    let app = TestApp::new();

    app.get("/health").await;
    assert_eq!(app.sheet.reads(), 0);
    assert_eq!(app.sheet.writes(), 0);
}
