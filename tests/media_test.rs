//! Integration tests for batch media uploads.

mod helpers;

use axum::http::StatusCode;

use helpers::PNG;

#[tokio::test]
async fn test_oversized_batch_stores_nothing() {
    let app = helpers::TestApp::new().await;
    let resident = app.resident().await;
    let names = ["a.png", "b.png", "c.png", "d.png", "e.png"];
    let parts: Vec<_> = names
        .iter()
        .map(|name| ("files", Some(*name), PNG))
        .collect();

    let response = app
        .multipart("/api/media/feed_image", &parts, &app.token(&resident))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_batch_with_bad_file_stores_nothing() {
    let app = helpers::TestApp::new().await;
    let resident = app.resident().await;

    let response = app
        .multipart(
            "/api/media/feed_image",
            &[
                ("files", Some("harbour.png"), PNG),
                ("files", Some("notes.exe"), b"MZ".as_slice()),
            ],
            &app.token(&resident),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_valid_batch_is_stored() {
    let app = helpers::TestApp::new().await;
    let resident = app.resident().await;

    let response = app
        .multipart(
            "/api/media/feed-image",
            &[
                ("files", Some("dunes.png"), PNG),
                ("files", Some("pier.png"), PNG),
            ],
            &app.token(&resident),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let uploaded = response.body["data"].as_array().unwrap();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0]["bucket"], "feedpostimages");
    assert!(
        uploaded[0]["public_url"]
            .as_str()
            .unwrap()
            .starts_with("/media/feedpostimages/")
    );
    assert_eq!(app.stored_file_count(), 2);
}

#[tokio::test]
async fn test_upload_requires_session() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("POST", "/api/media/feed_image", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_media_kind() {
    let app = helpers::TestApp::new().await;
    let resident = app.resident().await;
    let response = app
        .multipart(
            "/api/media/podcast",
            &[("files", Some("ep1.png"), PNG)],
            &app.token(&resident),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_file_count(), 0);
}
