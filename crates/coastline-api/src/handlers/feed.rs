//! Feed handlers: posts, pins and reports.

use axum::Json;
use axum::extract::State;

use coastline_core::types::{CommunityId, PageResponse, PostId};
use coastline_entity::post::{Post, PostReport};
use coastline_service::feed::NewPost;

use crate::dto::request::{PinRequest, ReportPostRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser, PaginationParams, ValidJson};
use crate::state::AppState;

/// GET /api/communities/{id}/feed
pub async fn list_feed(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(community): ApiPath<CommunityId>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Post>>>> {
    let page = state
        .feed
        .list_feed(&auth, community, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(post): ApiJson<NewPost>,
) -> ApiResult<Json<ApiResponse<Post>>> {
    let post = state.feed.create_post(&auth, post).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PostId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.feed.delete_post(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Post deleted"))))
}

/// PUT /api/posts/{id}/pin
pub async fn pin_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PostId>,
    ApiJson(req): ApiJson<PinRequest>,
) -> ApiResult<Json<ApiResponse<Post>>> {
    let post = state.feed.set_pinned(&auth, id, req.pinned).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/report
pub async fn report_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PostId>,
    ValidJson(req): ValidJson<ReportPostRequest>,
) -> ApiResult<Json<ApiResponse<PostReport>>> {
    let report = state.feed.report_post(&auth, id, &req.reason).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/communities/{id}/reports
pub async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(community): ApiPath<CommunityId>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<PostReport>>>> {
    let page = state
        .feed
        .list_reports(&auth, community, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
