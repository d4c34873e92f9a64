//! Friend requests and friendships.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use coastline_core::types::{FriendRequestId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{FriendRepository, ProfileRepository};
use coastline_entity::friend::{FriendRequest, FriendRequestStatus};
use coastline_entity::notification::{NewNotification, NotificationKind, TargetType};
use coastline_entity::profile::Profile;

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

#[derive(Clone)]
pub struct FriendService {
    friends: Arc<dyn FriendRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: Arc<NotificationCenter>,
}

impl FriendService {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            friends,
            profiles,
            notifications,
        }
    }

    /// Ask `recipient` to become friends.
    pub async fn send_request(
        &self,
        ctx: &RequestContext,
        recipient: UserId,
        reason: Option<String>,
    ) -> AppResult<FriendRequest> {
        let sender = ctx.user_id();
        if recipient == sender {
            return Err(AppError::validation("You cannot befriend yourself"));
        }
        if self.profiles.find_by_id(recipient).await?.is_none() {
            return Err(AppError::not_found(format!("Profile {recipient} not found")));
        }
        if self.friends.are_friends(sender, recipient).await? {
            return Err(AppError::conflict("You are already friends"));
        }
        if self.friends.pending_between(sender, recipient).await?.is_some() {
            return Err(AppError::conflict("A friend request is already pending"));
        }

        let request = self
            .friends
            .insert_request(&FriendRequest {
                id: FriendRequestId::new(),
                sender_id: sender,
                recipient_id: recipient,
                status: FriendRequestStatus::Pending,
                reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
                created_at: Utc::now(),
                responded_at: None,
            })
            .await?;
        info!(request_id = %request.id, %sender, %recipient, "Friend request sent");

        let mut notice = NewNotification::new(recipient, NotificationKind::FriendRequest)
            .actor(sender)
            .target(TargetType::FriendRequest, request.id);
        if let Some(reason) = &request.reason {
            notice = notice.snippet(reason);
        }
        self.notifications.deliver(notice).await;
        Ok(request)
    }

    /// Accept or reject a pending request addressed to the caller.
    pub async fn respond(
        &self,
        ctx: &RequestContext,
        id: FriendRequestId,
        accept: bool,
    ) -> AppResult<FriendRequest> {
        let request = self.find(id).await?;
        request.ensure_answerable_by(ctx.user_id())?;

        let status = if accept {
            FriendRequestStatus::Accepted
        } else {
            FriendRequestStatus::Rejected
        };
        let answered = self
            .friends
            .respond(id, status)
            .await?
            .ok_or_else(|| AppError::conflict("Friend request was already answered"))?;

        if accept {
            self.friends
                .add_friendship(answered.sender_id, answered.recipient_id)
                .await?;
            self.notifications
                .deliver(
                    NewNotification::new(answered.sender_id, NotificationKind::FriendAccept)
                        .actor(answered.recipient_id)
                        .target(TargetType::Profile, answered.recipient_id),
                )
                .await;
        }
        info!(request_id = %id, %status, "Friend request answered");
        Ok(answered)
    }

    /// Withdraw a pending request the caller sent.
    pub async fn cancel(&self, ctx: &RequestContext, id: FriendRequestId) -> AppResult<()> {
        let request = self.find(id).await?;
        if request.sender_id != ctx.user_id() {
            return Err(AppError::authorization("Only the sender can cancel a friend request"));
        }
        if request.status != FriendRequestStatus::Pending {
            return Err(AppError::conflict(format!(
                "Friend request is already {}",
                request.status
            )));
        }
        if !self.friends.delete_request(id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub async fn incoming(&self, ctx: &RequestContext) -> AppResult<Vec<FriendRequest>> {
        self.friends.incoming(ctx.user_id()).await
    }

    pub async fn outgoing(&self, ctx: &RequestContext) -> AppResult<Vec<FriendRequest>> {
        self.friends.outgoing(ctx.user_id()).await
    }

    /// Profiles of the caller's friends.
    pub async fn friends(&self, ctx: &RequestContext) -> AppResult<Vec<Profile>> {
        let ids: Vec<UserId> = self
            .friends
            .friends_of(ctx.user_id())
            .await?
            .into_iter()
            .map(|f| f.friend_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.profiles.find_many(&ids).await
    }

    pub async fn unfriend(&self, ctx: &RequestContext, other: UserId) -> AppResult<()> {
        if !self.friends.remove_friendship(ctx.user_id(), other).await? {
            return Err(AppError::not_found("You are not friends with this user"));
        }
        info!(user_id = %ctx.user_id(), friend_id = %other, "Friendship removed");
        Ok(())
    }

    async fn find(&self, id: FriendRequestId) -> AppResult<FriendRequest> {
        self.friends.find_request(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: FriendRequestId) -> AppError {
    AppError::not_found(format!("Friend request {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, ctx, resident};
    use coastline_core::error::ErrorKind;

    async fn setup() -> (Fixture, FriendService, RequestContext, RequestContext) {
        let fx = Fixture::new().await;
        let svc = FriendService::new(fx.db.friends.clone(), fx.db.profiles.clone(), fx.notifications());
        let a = ctx(&fx.add(resident(fx.community.id)).await);
        let b = ctx(&fx.add(resident(fx.community.id)).await);
        (fx, svc, a, b)
    }

    #[tokio::test]
    async fn test_accept_creates_mutual_friendship() {
        let (_fx, svc, a, b) = setup().await;
        let request = svc.send_request(&a, b.user_id(), None).await.unwrap();
        svc.respond(&b, request.id, true).await.unwrap();

        assert_eq!(svc.friends(&a).await.unwrap()[0].id, b.user_id());
        assert_eq!(svc.friends(&b).await.unwrap()[0].id, a.user_id());

        let err = svc.send_request(&b, a.user_id(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_and_self_requests_rejected() {
        let (_fx, svc, a, b) = setup().await;
        assert_eq!(
            svc.send_request(&a, a.user_id(), None).await.unwrap_err().kind,
            ErrorKind::Validation
        );
        svc.send_request(&a, b.user_id(), Some("neighbours".into())).await.unwrap();
        assert_eq!(
            svc.send_request(&b, a.user_id(), None).await.unwrap_err().kind,
            ErrorKind::Conflict
        );
    }

    #[tokio::test]
    async fn test_only_recipient_responds_and_sender_cancels() {
        let (_fx, svc, a, b) = setup().await;
        let request = svc.send_request(&a, b.user_id(), None).await.unwrap();

        assert_eq!(
            svc.respond(&a, request.id, true).await.unwrap_err().kind,
            ErrorKind::Authorization
        );
        assert_eq!(
            svc.cancel(&b, request.id).await.unwrap_err().kind,
            ErrorKind::Authorization
        );
        svc.cancel(&a, request.id).await.unwrap();
        assert!(svc.incoming(&b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unfriend() {
        let (_fx, svc, a, b) = setup().await;
        let request = svc.send_request(&a, b.user_id(), None).await.unwrap();
        svc.respond(&b, request.id, true).await.unwrap();

        svc.unfriend(&b, a.user_id()).await.unwrap();
        assert!(svc.friends(&a).await.unwrap().is_empty());
        assert_eq!(
            svc.unfriend(&b, a.user_id()).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }
}
