//! Profile handlers.

use axum::Json;
use axum::extract::State;

use coastline_core::types::UserId;
use coastline_entity::profile::Profile;

use crate::dto::request::UpdateProfileRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiPath, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = state.profiles.me(&auth).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /api/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = state.profiles.update_me(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /api/profiles/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = state.profiles.get(id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// DELETE /api/profiles/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.profiles.delete_profile(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Profile deleted"))))
}
