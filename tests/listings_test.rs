//! Integration tests for property listings, favorites and inquiries.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

/// Create a listing as `seller` and approve it as a fresh admin.
async fn approved_listing(app: &helpers::TestApp, seller_token: &str) -> String {
    let created = app
        .request(
            "POST",
            "/api/properties",
            Some(json!({
                "title": "Clifftop bungalow",
                "price": 425000.0,
                "listing_type": "Sale",
                "bedrooms": 3
            })),
            Some(seller_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let admin = app.admin().await;
    let decided = app
        .request(
            "POST",
            &format!(
                "/api/communities/{}/admin/approvals/property/{id}",
                app.community.id
            ),
            Some(json!({ "decision": "approve" })),
            Some(&app.token(&admin)),
        )
        .await;
    assert_eq!(decided.status, StatusCode::OK);
    id
}

#[tokio::test]
async fn test_missing_property_is_404_for_everyone() {
    let app = helpers::TestApp::new().await;
    let uri = format!("/api/properties/{}", Uuid::now_v7());

    let anonymous = app.request("GET", &uri, None, None).await;
    assert_eq!(anonymous.status, StatusCode::NOT_FOUND);
    assert_eq!(anonymous.body["error"], "NOT_FOUND");
    assert!(anonymous.body["message"].is_string());

    let resident = app.resident().await;
    let signed_in = app.request("GET", &uri, None, Some(&app.token(&resident))).await;
    assert_eq!(signed_in.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pending_listing_hidden_from_others() {
    let app = helpers::TestApp::new().await;
    let seller = app.resident().await;
    let seller_token = app.token(&seller);
    let created = app
        .request(
            "POST",
            "/api/properties",
            Some(json!({ "title": "Boathouse", "price": 900.0, "listing_type": "Rent" })),
            Some(&seller_token),
        )
        .await;
    let uri = format!("/api/properties/{}", created.body["data"]["id"].as_str().unwrap());

    assert_eq!(app.request("GET", &uri, None, None).await.status, StatusCode::NOT_FOUND);
    let neighbour = app.resident().await;
    assert_eq!(
        app.request("GET", &uri, None, Some(&app.token(&neighbour))).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.request("GET", &uri, None, Some(&seller_token)).await.status,
        StatusCode::OK
    );

    let mine = app
        .request("GET", "/api/properties/mine", None, Some(&seller_token))
        .await;
    assert_eq!(mine.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_favorite_toggle_leaves_no_row() {
    let app = helpers::TestApp::new().await;
    let seller = app.resident().await;
    let id = approved_listing(&app, &app.token(&seller)).await;

    let buyer = app.resident().await;
    let buyer_token = app.token(&buyer);
    let uri = format!("/api/properties/{id}/favorite");

    let on = app.request("POST", &uri, None, Some(&buyer_token)).await;
    assert_eq!(on.status, StatusCode::OK);
    assert_eq!(on.body["data"]["favorited"], true);

    let off = app.request("POST", &uri, None, Some(&buyer_token)).await;
    assert_eq!(off.body["data"]["favorited"], false);

    let favorites = app.db.favorites.list(buyer.id).await.unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_inquiry_notifies_seller() {
    let app = helpers::TestApp::new().await;
    let seller = app.resident().await;
    let seller_token = app.token(&seller);
    let id = approved_listing(&app, &seller_token).await;

    let buyer = app.resident().await;
    let response = app
        .request(
            "POST",
            "/api/properties/inquiry",
            Some(json!({
                "community_id": app.community.id,
                "property_id": id,
                "seller_id": seller.id,
                "sender_id": buyer.id,
                "name": "Robin",
                "email": "robin@example.com",
                "phone": "555-0101",
                "message": "Could I view it on Saturday?"
            })),
            Some(&app.token(&buyer)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["property_id"], id.as_str());

    let received = app
        .request("GET", "/api/properties/inquiries", None, Some(&seller_token))
        .await;
    assert_eq!(received.body["data"]["total_items"], 1);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&seller_token))
        .await;
    let kinds: Vec<_> = inbox.body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].clone())
        .collect();
    assert!(kinds.iter().any(|k| k == "property_inquiry"));
}

#[tokio::test]
async fn test_inquiry_body_is_validated() {
    let app = helpers::TestApp::new().await;
    let buyer = app.resident().await;
    let response = app
        .request(
            "POST",
            "/api/properties/inquiry",
            Some(json!({
                "community_id": app.community.id,
                "property_id": Uuid::now_v7(),
                "seller_id": Uuid::now_v7(),
                "sender_id": buyer.id,
                "name": "Robin",
                "email": "robin-at-example",
                "message": "Hello"
            })),
            Some(&app.token(&buyer)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_writes_require_a_session() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/properties",
            Some(json!({ "title": "Shed", "price": 1.0, "listing_type": "Rent" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");

    let forged = app
        .request("GET", "/api/me", None, Some("not.a.token"))
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}
