//! Community, access report and alert handlers.

use axum::Json;
use axum::extract::State;

use coastline_auth::AccessReport;
use coastline_core::types::CommunityId;
use coastline_entity::community::{Community, CommunityAlert};
use coastline_service::community::NewAlert;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/communities
pub async fn list_communities(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Community>>>> {
    Ok(Json(ApiResponse::ok(state.communities.list().await?)))
}

/// GET /api/communities/{id}
pub async fn get_community(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CommunityId>,
) -> ApiResult<Json<ApiResponse<Community>>> {
    Ok(Json(ApiResponse::ok(state.communities.get(id).await?)))
}

/// GET /api/communities/slug/{slug}
pub async fn get_community_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Community>>> {
    Ok(Json(ApiResponse::ok(
        state.communities.get_by_slug(&slug).await?,
    )))
}

/// GET /api/communities/{id}/access
pub async fn access(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<CommunityId>,
) -> ApiResult<Json<ApiResponse<AccessReport>>> {
    let report = state.communities.access(&auth, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/communities/{id}/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CommunityId>,
) -> ApiResult<Json<ApiResponse<Vec<CommunityAlert>>>> {
    Ok(Json(ApiResponse::ok(
        state.communities.active_alerts(id).await?,
    )))
}

/// POST /api/communities/{id}/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<CommunityId>,
    ApiJson(alert): ApiJson<NewAlert>,
) -> ApiResult<Json<ApiResponse<CommunityAlert>>> {
    let alert = state.communities.create_alert(&auth, id, alert).await?;
    Ok(Json(ApiResponse::ok(alert)))
}
