//! Marketplace handlers.

use axum::Json;
use axum::extract::State;

use coastline_core::types::{MarketItemId, PageResponse};
use coastline_entity::favorite::FavoriteState;
use coastline_entity::market::MarketItem;

use crate::dto::request::{ListingFilter, MarketItemRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{
    ApiPath, ApiQuery, AuthUser, OptionalAuthUser, PaginationParams, ValidJson,
};
use crate::handlers::property::listing_community;
use crate::state::AppState;

/// GET /api/market
pub async fn list_items(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ApiQuery(filter): ApiQuery<ListingFilter>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<MarketItem>>>> {
    let community = listing_community(viewer.context(), filter.community_id)?;
    let page = state
        .market
        .list(community, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/market
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<MarketItemRequest>,
) -> ApiResult<Json<ApiResponse<MarketItem>>> {
    let (community, draft) = req.into_parts();
    let item = state.market.create(&auth, community, draft).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// GET /api/market/mine
pub async fn my_items(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<MarketItem>>>> {
    Ok(Json(ApiResponse::ok(state.market.list_mine(&auth).await?)))
}

/// GET /api/market/{id}
pub async fn get_item(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ApiPath(id): ApiPath<MarketItemId>,
) -> ApiResult<Json<ApiResponse<MarketItem>>> {
    let item = state.market.get(viewer.context(), id).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// PUT /api/market/{id}
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<MarketItemId>,
    ValidJson(req): ValidJson<MarketItemRequest>,
) -> ApiResult<Json<ApiResponse<MarketItem>>> {
    let (_, draft) = req.into_parts();
    let item = state.market.update(&auth, id, draft).await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// DELETE /api/market/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<MarketItemId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.market.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Item deleted"))))
}

/// POST /api/market/{id}/wishlist
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<MarketItemId>,
) -> ApiResult<Json<ApiResponse<FavoriteState>>> {
    let state_after = state.market.toggle_wishlist(&auth, id).await?;
    Ok(Json(ApiResponse::ok(state_after)))
}
