//! Sticker and sticker pack handlers.

use axum::Json;
use axum::extract::{Multipart, State};

use coastline_core::types::{CommunityId, StickerId, StickerPackId};
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem, StickerPackWithItems};
use coastline_service::sticker::StickerUpload;

use crate::dto::request::{AddPackItemRequest, CreatePackRequest, StickerFilter};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser, OptionalAuthUser, ValidJson};
use crate::handlers::media::read_multipart;
use crate::state::AppState;

/// GET /api/communities/{id}/stickers
pub async fn list_stickers(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    ApiPath(community): ApiPath<CommunityId>,
    ApiQuery(filter): ApiQuery<StickerFilter>,
) -> ApiResult<Json<ApiResponse<Vec<Sticker>>>> {
    let stickers = state
        .stickers
        .list_stickers(
            viewer.context(),
            community,
            filter.category.as_deref(),
            filter.include_pending,
        )
        .await?;
    Ok(Json(ApiResponse::ok(stickers)))
}

/// POST /api/communities/{id}/stickers
///
/// Multipart with one `file` plus `label`, `category` and `section` fields.
pub async fn upload_sticker(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(community): ApiPath<CommunityId>,
    multipart: Multipart,
) -> ApiResult<Json<ApiResponse<Sticker>>> {
    let mut form = read_multipart(multipart).await?;
    if form.files.len() != 1 {
        return Err(ApiError::validation("Exactly one sticker image is required"));
    }
    let meta = StickerUpload {
        label: form.field("label").unwrap_or_default().to_string(),
        category: form.field("category").unwrap_or_default().to_string(),
        section: form.field("section").unwrap_or("general").to_string(),
    };
    let file = form.files.remove(0);

    let sticker = state
        .stickers
        .upload_sticker(&auth, community, meta, file)
        .await?;
    Ok(Json(ApiResponse::ok(sticker)))
}

/// PUT /api/stickers/{id}/approve
pub async fn approve_sticker(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<StickerId>,
) -> ApiResult<Json<ApiResponse<Sticker>>> {
    Ok(Json(ApiResponse::ok(
        state.stickers.approve_sticker(&auth, id).await?,
    )))
}

/// DELETE /api/stickers/{id}
pub async fn delete_sticker(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<StickerId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.stickers.delete_sticker(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Sticker deleted"))))
}

/// GET /api/communities/{id}/sticker-packs
pub async fn list_packs(
    State(state): State<AppState>,
    ApiPath(community): ApiPath<CommunityId>,
) -> ApiResult<Json<ApiResponse<Vec<StickerPackWithItems>>>> {
    Ok(Json(ApiResponse::ok(
        state.stickers.list_packs(community).await?,
    )))
}

/// POST /api/communities/{id}/sticker-packs
pub async fn create_pack(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(community): ApiPath<CommunityId>,
    ValidJson(req): ValidJson<CreatePackRequest>,
) -> ApiResult<Json<ApiResponse<StickerPack>>> {
    let pack = state
        .stickers
        .create_pack(&auth, community, &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(pack)))
}

/// POST /api/sticker-packs/{id}/items
pub async fn add_to_pack(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(pack): ApiPath<StickerPackId>,
    ApiJson(req): ApiJson<AddPackItemRequest>,
) -> ApiResult<Json<ApiResponse<StickerPackItem>>> {
    let item = state
        .stickers
        .add_to_pack(&auth, pack, req.sticker_id)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}
