//! Notification center handlers.

use axum::Json;
use axum::extract::State;

use coastline_core::types::NotificationId;
use coastline_entity::notification::NotificationView;
use coastline_service::NotificationSnapshot;

use crate::dto::request::UnseenRequest;
use crate::dto::response::{ApiResponse, CountResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<NotificationSnapshot>>> {
    let snapshot = state.notifications.snapshot(auth.user_id()).await?;
    Ok(Json(ApiResponse::ok(snapshot.as_ref().clone())))
}

/// POST /api/notifications/unseen
pub async fn unseen(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<UnseenRequest>,
) -> ApiResult<Json<ApiResponse<Vec<NotificationView>>>> {
    let fresh = state.notifications.unseen(auth.user_id(), &req.seen).await?;
    Ok(Json(ApiResponse::ok(fresh)))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.notifications.mark_as_read(auth.user_id(), id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Marked as read"))))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let count = state.notifications.mark_all_as_read(auth.user_id()).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
