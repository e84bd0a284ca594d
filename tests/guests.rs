mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, TestApp};

#[tokio::test]
async fn lookup_returns_the_party() {
    let app = TestApp::new();

    let resp = app.get("/codes/ab12cd").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["cache-control"], "no-store");

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["invitationCode"], "AB12CD");
    assert_eq!(body["data"]["guestNames"][1], "Bjorn");
    assert_eq!(body["data"]["rsvpStatus"], "pending");
    assert_eq!(body["data"]["perGuestStatuses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn lookup_decodes_answered_party() {
    let app = TestApp::new();

    let body = body_json(app.get("/codes/DONE22").await).await;
    let data = &body["data"];
    assert_eq!(data["rsvpStatus"], "attending");
    assert_eq!(data["perGuestStatuses"][0], "attending");
    assert_eq!(data["perGuestStatuses"][1], "not_attending");
    assert_eq!(data["dietaryRestrictions"][0], "Dana Lee: vegetarian");
    assert_eq!(data["contactEmail"], "dana@example.com");
}

#[tokio::test]
async fn lookup_rejects_bad_format_without_reading_the_sheet() {
    let app = TestApp::new();

    for code in ["AB1", "ABCDEFGH9", "AB-12"] {
        let resp = app.get(&format!("/codes/{code}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "code {code}");
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid invitation code format");
    }
    assert_eq!(app.sheet.reads(), 0);
}

#[tokio::test]
async fn unknown_code_is_not_found_and_negatively_cached() {
    let app = TestApp::new();

    let resp = app.get("/codes/AB12").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invitation code not found");

    let resp = app.get("/codes/ab12").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.sheet.reads(), 1);
}

#[tokio::test]
async fn repeated_lookups_are_served_from_cache() {
    let app = TestApp::new();

    assert_eq!(app.store.lookup("SOLO1").await.unwrap().unwrap().guest_names, ["Carl Jones"]);
    assert!(app.store.lookup("solo1").await.unwrap().is_some());
    assert_eq!(app.sheet.reads(), 1);
}

#[tokio::test]
async fn transient_provider_errors_are_retried() {
    let app = TestApp::new();
    app.sheet.fail_next(2, 503, "backend unavailable");

    let resp = app.get("/codes/SOLO1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.sheet.reads(), 3);
}

#[tokio::test]
async fn provider_outage_is_503_without_raw_text() {
    let app = TestApp::new();
    app.sheet.fail_next(3, 500, "internal stack trace: sheets-backend-7f9");

    let resp = app.get("/codes/SOLO1").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(!body.to_string().contains("sheets-backend-7f9"));
    assert_eq!(app.sheet.reads(), 3);
}

#[tokio::test]
async fn rate_limits_get_a_try_later_message() {
    let app = TestApp::new();
    app.sheet.fail_next(3, 429, "Quota exceeded for quota metric");

    let resp = app.get("/codes/SOLO1").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn auth_failures_are_not_retried() {
    let app = TestApp::new();
    app.sheet.fail_next(1, 403, "The caller does not have permission");

    let resp = app.get("/codes/SOLO1").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Service configuration error");
    assert_eq!(app.sheet.reads(), 1);
}

#[tokio::test]
async fn status_reports_submission_state() {
    let app = TestApp::new();

    let body = body_json(app.get("/codes/DONE22/status").await).await;
    assert_eq!(body["data"]["submitted"], true);

    let body = body_json(app.get("/codes/AB12CD/status").await).await;
    assert_eq!(body["data"]["submitted"], false);

    let resp = app.get("/codes/ZZ99/status").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["submitted"], false);

    let resp = app.get("/codes/x/status").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_details_come_from_configuration() {
    let app = TestApp::new();

    let resp = app.get("/event").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["venue"], "The Old Mill");
    assert_eq!(body["data"]["date"], "2026-06-20");
    assert_eq!(body["data"]["coupleNames"], "Anna & Bjorn");
}

#[tokio::test]
async fn all_entries_lists_every_party_in_sheet_order() {
    let app = TestApp::new();

    let entries = app.store.all_entries().await.unwrap();
    let codes: Vec<&str> = entries.iter().map(|e| e.invitation_code.as_str()).collect();
    assert_eq!(codes, ["AB12CD", "SOLO1", "NORD88", "DONE22"]);
    assert_eq!(entries[3].attending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_codes_expire_before_found_ones() {
    let app = TestApp::new();

    assert!(app.store.lookup("AB12").await.unwrap().is_none());
    assert!(app.store.lookup("SOLO1").await.unwrap().is_some());
    assert_eq!(app.sheet.reads(), 2);

    tokio::time::advance(Duration::from_secs(31)).await;

    assert!(app.store.lookup("AB12").await.unwrap().is_none());
    assert_eq!(app.sheet.reads(), 3, "miss is re-read after the short ttl");

    assert!(app.store.lookup("SOLO1").await.unwrap().is_some());
    assert_eq!(app.sheet.reads(), 3, "hit is still cached");
}

#[tokio::test]
async fn undecodable_path_gets_json_error() {
    let app = TestApp::new();

    let resp = app.get("/codes/%FF%FE").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Bad request");
    assert_eq!(app.sheet.reads(), 0);
}
