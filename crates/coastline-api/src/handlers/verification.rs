//! Location verification handlers.

use axum::Json;
use axum::extract::State;

use coastline_entity::verification::VerificationRequest;

use crate::dto::request::VerificationBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/verification
pub async fn latest(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Option<VerificationRequest>>>> {
    Ok(Json(ApiResponse::ok(
        state.verifications.latest(&auth).await?,
    )))
}

/// POST /api/verification
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<VerificationBody>,
) -> ApiResult<Json<ApiResponse<VerificationRequest>>> {
    let request = state.verifications.submit(&auth, body.into()).await?;
    Ok(Json(ApiResponse::ok(request)))
}
