//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database_ok = state.db.health_check().await.unwrap_or(false);
    let storage = state.media.storage();
    let storage_ok = storage.health_check().await;

    Json(ApiResponse::ok(HealthResponse {
        status: if database_ok && storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: state.db.provider().to_string(),
        database_ok,
        storage: storage.provider_type().to_string(),
        storage_ok,
        translation_enabled: state.translator.is_enabled(),
    }))
}
