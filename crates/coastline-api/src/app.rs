//! Application builder: wires router, middleware and state into an Axum app.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// With the local storage provider, stored objects are also served under
/// `storage.local_public_url`.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let max_body = server.max_body_mb.saturating_mul(1024 * 1024);
    let timeout = Duration::from_secs(server.request_timeout_seconds.max(1));
    let cors = build_cors_layer(&server.cors);

    let storage = &state.config.storage;
    let mount = storage.local_public_url.trim_end_matches('/').to_string();
    let local_media = (storage.provider == "local" && mount.starts_with('/') && mount.len() > 1)
        .then(|| (mount, ServeDir::new(&storage.local_root)));

    let mut router = build_router(state);
    if let Some((mount, dir)) = local_media {
        router = router.nest_service(&mount, dir);
    }

    router
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}
