//! Integration tests for health, sessions and community access.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use coastline_entity::approval::ApprovalStatus;
use coastline_entity::profile::ProfileRole;

#[tokio::test]
async fn test_health_reports_backends() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["storage"], "local");
    assert_eq!(response.body["data"]["translation_enabled"], false);
}

#[tokio::test]
async fn test_me_round_trip() {
    let app = helpers::TestApp::new().await;
    let resident = app.resident().await;
    let token = app.token(&resident);

    let me = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["id"], resident.id.to_string());

    let updated = app
        .request(
            "PUT",
            "/api/me",
            Some(json!({ "full_name": "Marina Keel" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["full_name"], "Marina Keel");

    let too_short = app
        .request("PUT", "/api/me", Some(json!({ "username": "ab" })), Some(&token))
        .await;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_short.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_token_without_profile_is_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.orphan_token();

    let response = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_access_report_by_role() {
    let app = helpers::TestApp::new().await;
    let uri = format!("/api/communities/{}/access", app.community.id);

    let pending = app
        .create_profile(ProfileRole::Resident, ApprovalStatus::Pending)
        .await;
    let report = app.request("GET", &uri, None, Some(&app.token(&pending))).await;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.body["data"]["is_member"], false);
    assert_eq!(report.body["data"]["actions"]["contribute"], false);

    let admin = app.admin().await;
    let report = app.request("GET", &uri, None, Some(&app.token(&admin))).await;
    assert_eq!(report.body["data"]["is_admin"], true);
    assert_eq!(report.body["data"]["actions"]["review_approvals"], true);
    assert_eq!(report.body["data"]["actions"]["delete_profile"], false);
}

#[tokio::test]
async fn test_community_lookup() {
    let app = helpers::TestApp::new().await;

    let by_slug = app
        .request("GET", "/api/communities/slug/seal-cove", None, None)
        .await;
    assert_eq!(by_slug.status, StatusCode::OK);
    assert_eq!(by_slug.body["data"]["name"], "Seal Cove");

    let missing = app
        .request("GET", "/api/communities/slug/nowhere", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
