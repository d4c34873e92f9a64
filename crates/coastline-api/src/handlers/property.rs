//! Property listing, favorite and inquiry handlers.

use axum::Json;
use axum::extract::State;

use coastline_core::AppError;
use coastline_core::types::{CommunityId, PageResponse, PropertyId};
use coastline_entity::favorite::FavoriteState;
use coastline_entity::inquiry::PropertyInquiry;
use coastline_entity::property::Property;
use coastline_service::RequestContext;

use crate::dto::request::{InquiryRequest, ListingFilter, PropertyRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{
    ApiPath, ApiQuery, AuthUser, OptionalAuthUser, PaginationParams, ValidJson,
};
use crate::state::AppState;

/// Community a public listing query reads: the one asked for, else the
/// caller's own.
pub(crate) fn listing_community(
    viewer: Option<&RequestContext>,
    requested: Option<CommunityId>,
) -> Result<CommunityId, AppError> {
    requested
        .or_else(|| viewer.and_then(|ctx| ctx.profile.community_id))
        .ok_or_else(|| AppError::validation("community_id is required"))
}

/// GET /api/properties
pub async fn list_properties(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ApiQuery(filter): ApiQuery<ListingFilter>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Property>>>> {
    let community = listing_community(viewer.context(), filter.community_id)?;
    let page = state
        .properties
        .list(community, filter.listing_type, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/properties
pub async fn create_property(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<PropertyRequest>,
) -> ApiResult<Json<ApiResponse<Property>>> {
    let (community, draft) = req.into_parts();
    let property = state.properties.create(&auth, community, draft).await?;
    Ok(Json(ApiResponse::ok(property)))
}

/// GET /api/properties/mine
pub async fn my_properties(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Property>>>> {
    Ok(Json(ApiResponse::ok(
        state.properties.list_mine(&auth).await?,
    )))
}

/// GET /api/properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ApiPath(id): ApiPath<PropertyId>,
) -> ApiResult<Json<ApiResponse<Property>>> {
    let property = state.properties.get(viewer.context(), id).await?;
    Ok(Json(ApiResponse::ok(property)))
}

/// PUT /api/properties/{id}
pub async fn update_property(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PropertyId>,
    ValidJson(req): ValidJson<PropertyRequest>,
) -> ApiResult<Json<ApiResponse<Property>>> {
    let (_, draft) = req.into_parts();
    let property = state.properties.update(&auth, id, draft).await?;
    Ok(Json(ApiResponse::ok(property)))
}

/// DELETE /api/properties/{id}
pub async fn delete_property(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PropertyId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.properties.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Property deleted"))))
}

/// POST /api/properties/{id}/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<PropertyId>,
) -> ApiResult<Json<ApiResponse<FavoriteState>>> {
    let favorite = state.properties.toggle_favorite(&auth, id).await?;
    Ok(Json(ApiResponse::ok(favorite)))
}

/// POST /api/properties/inquiry
pub async fn create_inquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<InquiryRequest>,
) -> ApiResult<Json<ApiResponse<PropertyInquiry>>> {
    let inquiry = state.properties.create_inquiry(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(inquiry)))
}

/// GET /api/properties/inquiries
pub async fn inquiries_received(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<PropertyInquiry>>>> {
    let page = state
        .properties
        .inquiries_received(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
