//! Translation proxy handler.

use axum::Json;
use axum::extract::State;

use coastline_service::TranslationRequest;

use crate::dto::response::{ApiResponse, TranslationResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, AuthUser};
use crate::state::AppState;

/// POST /api/translate
pub async fn translate(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(req): ApiJson<TranslationRequest>,
) -> ApiResult<Json<ApiResponse<TranslationResponse>>> {
    let translated_text = state.translator.translate(&req).await?;
    Ok(Json(ApiResponse::ok(TranslationResponse { translated_text })))
}
