//! Admin approval queue handlers.
//!
//! One set of routes serves every kind; `{kind}` is one of `user`,
//! `business`, `property`, `market_item` or `verification`.

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use coastline_core::types::{CommunityId, PageResponse};
use coastline_entity::approval::{ApprovalCounts, ApprovalItem, ApprovalKind};
use coastline_service::ApprovalOutcome;

use crate::dto::request::DecisionRequest;
use crate::dto::response::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

fn parse_kind(raw: &str) -> Result<ApprovalKind, ApiError> {
    Ok(raw.parse::<ApprovalKind>()?)
}

/// GET /api/communities/{id}/admin/approvals
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(community): ApiPath<CommunityId>,
) -> ApiResult<Json<ApiResponse<Vec<ApprovalCounts>>>> {
    let counts = state.approvals.dashboard(&auth, community).await?;
    Ok(Json(ApiResponse::ok(counts)))
}

/// GET /api/communities/{id}/admin/approvals/{kind}
pub async fn queue(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((community, kind)): ApiPath<(CommunityId, String)>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ApprovalItem>>>> {
    let kind = parse_kind(&kind)?;
    let page = state
        .approvals
        .queue(&auth, community, kind, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/communities/{id}/admin/approvals/{kind}/{item_id}
pub async fn decide(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((community, kind, item)): ApiPath<(CommunityId, String, Uuid)>,
    ApiJson(req): ApiJson<DecisionRequest>,
) -> ApiResult<Json<ApiResponse<ApprovalOutcome>>> {
    let kind = parse_kind(&kind)?;
    let outcome = state
        .approvals
        .decide(&auth, community, kind, item, req.decision)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
