//! Friend and friend-request handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use coastline_core::types::{FriendRequestId, UserId};
use coastline_entity::friend::FriendRequest;
use coastline_entity::profile::Profile;

use crate::dto::request::{FriendRequestBody, RespondFriendRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser, ValidJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FriendRequestLists {
    pub incoming: Vec<FriendRequest>,
    pub outgoing: Vec<FriendRequest>,
}

/// GET /api/friends
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Profile>>>> {
    Ok(Json(ApiResponse::ok(state.friends.friends(&auth).await?)))
}

/// DELETE /api/friends/{id}
pub async fn unfriend(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(other): ApiPath<UserId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.friends.unfriend(&auth, other).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Friend removed"))))
}

/// GET /api/friends/requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FriendRequestLists>>> {
    let incoming = state.friends.incoming(&auth).await?;
    let outgoing = state.friends.outgoing(&auth).await?;
    Ok(Json(ApiResponse::ok(FriendRequestLists { incoming, outgoing })))
}

/// POST /api/friends/requests
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<FriendRequestBody>,
) -> ApiResult<Json<ApiResponse<FriendRequest>>> {
    let request = state
        .friends
        .send_request(&auth, req.recipient_id, req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// PUT /api/friends/requests/{id}
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<FriendRequestId>,
    ApiJson(req): ApiJson<RespondFriendRequest>,
) -> ApiResult<Json<ApiResponse<FriendRequest>>> {
    let request = state.friends.respond(&auth, id, req.accept).await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// DELETE /api/friends/requests/{id}
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<FriendRequestId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.friends.cancel(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Request cancelled"))))
}
