//! Route definitions for the CoastlineVibe HTTP API.
//!
//! All routes are organized by area and mounted under `/api`.

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Every `/api` route, before middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(profile_routes())
        .merge(community_routes())
        .merge(approval_routes())
        .merge(property_routes())
        .merge(market_routes())
        .merge(feed_routes())
        .merge(notification_routes())
        .merge(friend_routes())
        .merge(verification_routes())
        .merge(media_routes())
        .merge(sticker_routes())
        .merge(translate_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(handlers::profile::me).put(handlers::profile::update_me),
        )
        .route(
            "/profiles/{id}",
            get(handlers::profile::get_profile).delete(handlers::profile::delete_profile),
        )
}

fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/communities", get(handlers::community::list_communities))
        .route("/communities/{id}", get(handlers::community::get_community))
        .route(
            "/communities/slug/{slug}",
            get(handlers::community::get_community_by_slug),
        )
        .route("/communities/{id}/access", get(handlers::community::access))
        .route(
            "/communities/{id}/alerts",
            get(handlers::community::list_alerts).post(handlers::community::create_alert),
        )
}

/// Admin dashboard and queues; every handler checks the caller administers `{id}`.
fn approval_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/communities/{id}/admin/approvals",
            get(handlers::approval::dashboard),
        )
        .route(
            "/communities/{id}/admin/approvals/{kind}",
            get(handlers::approval::queue),
        )
        .route(
            "/communities/{id}/admin/approvals/{kind}/{item_id}",
            post(handlers::approval::decide),
        )
}

fn property_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(handlers::property::list_properties).post(handlers::property::create_property),
        )
        .route("/properties/mine", get(handlers::property::my_properties))
        .route("/properties/inquiry", post(handlers::property::create_inquiry))
        .route(
            "/properties/inquiries",
            get(handlers::property::inquiries_received),
        )
        .route(
            "/properties/{id}",
            get(handlers::property::get_property)
                .put(handlers::property::update_property)
                .delete(handlers::property::delete_property),
        )
        .route(
            "/properties/{id}/favorite",
            post(handlers::property::toggle_favorite),
        )
}

fn market_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/market",
            get(handlers::market::list_items).post(handlers::market::create_item),
        )
        .route("/market/mine", get(handlers::market::my_items))
        .route(
            "/market/{id}",
            get(handlers::market::get_item)
                .put(handlers::market::update_item)
                .delete(handlers::market::delete_item),
        )
        .route("/market/{id}/wishlist", post(handlers::market::toggle_wishlist))
}

fn feed_routes() -> Router<AppState> {
    Router::new()
        .route("/communities/{id}/feed", get(handlers::feed::list_feed))
        .route("/communities/{id}/reports", get(handlers::feed::list_reports))
        .route("/posts", post(handlers::feed::create_post))
        .route("/posts/{id}", delete(handlers::feed::delete_post))
        .route("/posts/{id}/pin", put(handlers::feed::pin_post))
        .route("/posts/{id}/report", post(handlers::feed::report_post))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route("/notifications/unseen", post(handlers::notification::unseen))
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends", get(handlers::friend::list_friends))
        .route(
            "/friends/requests",
            get(handlers::friend::list_requests).post(handlers::friend::send_request),
        )
        .route(
            "/friends/requests/{id}",
            put(handlers::friend::respond).delete(handlers::friend::cancel),
        )
        .route("/friends/{id}", delete(handlers::friend::unfriend))
}

fn verification_routes() -> Router<AppState> {
    Router::new().route(
        "/verification",
        get(handlers::verification::latest).post(handlers::verification::submit),
    )
}

fn media_routes() -> Router<AppState> {
    Router::new().route("/media/{kind}", post(handlers::media::upload))
}

fn sticker_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/communities/{id}/stickers",
            get(handlers::sticker::list_stickers).post(handlers::sticker::upload_sticker),
        )
        .route(
            "/communities/{id}/sticker-packs",
            get(handlers::sticker::list_packs).post(handlers::sticker::create_pack),
        )
        .route(
            "/stickers/{id}/approve",
            put(handlers::sticker::approve_sticker),
        )
        .route("/stickers/{id}", delete(handlers::sticker::delete_sticker))
        .route(
            "/sticker-packs/{id}/items",
            post(handlers::sticker::add_to_pack),
        )
}

fn translate_routes() -> Router<AppState> {
    Router::new().route("/translate", post(handlers::translate::translate))
}
