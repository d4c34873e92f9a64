//! Friend request and friendship repository.

use async_trait::async_trait;
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::{FriendRequestId, UserId};
use coastline_entity::friend::{FriendRequest, FriendRequestStatus, Friendship};

use crate::query_error;
use crate::repository::FriendRepository;

#[derive(Debug, Clone)]
pub struct PgFriendRepository {
    pool: PgPool,
}

impl PgFriendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for PgFriendRepository {
    async fn insert_request(&self, request: &FriendRequest) -> AppResult<FriendRequest> {
        sqlx::query_as::<_, FriendRequest>(
            "INSERT INTO friend_requests (id, sender_id, recipient_id, status, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(request.id)
        .bind(request.sender_id)
        .bind(request.recipient_id)
        .bind(request.status)
        .bind(&request.reason)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert friend request"))
    }

    async fn find_request(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>("SELECT * FROM friend_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find friend request"))
    }

    async fn pending_between(&self, a: UserId, b: UserId) -> AppResult<Option<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE status = 'pending' \
             AND ((sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)) \
             LIMIT 1",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to look up pending friend request"))
    }

    async fn respond(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> AppResult<Option<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>(
            "UPDATE friend_requests SET status = $2, responded_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to answer friend request"))
    }

    async fn delete_request(&self, id: FriendRequestId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to delete friend request"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn incoming(&self, recipient: UserId) -> AppResult<Vec<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE recipient_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC",
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list incoming friend requests"))
    }

    async fn outgoing(&self, sender: UserId) -> AppResult<Vec<FriendRequest>> {
        sqlx::query_as::<_, FriendRequest>(
            "SELECT * FROM friend_requests WHERE sender_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC",
        )
        .bind(sender)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list outgoing friend requests"))
    }

    async fn add_friendship(&self, a: UserId, b: UserId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO friends (user_id, friend_id, created_at) VALUES ($1, $2, NOW()), ($2, $1, NOW()) \
             ON CONFLICT (user_id, friend_id) DO NOTHING",
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to add friendship"))?;
        Ok(())
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM friends WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to check friendship"))
    }

    async fn friends_of(&self, user: UserId) -> AppResult<Vec<Friendship>> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friends WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list friends"))
    }

    async fn remove_friendship(&self, a: UserId, b: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM friends WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)",
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to remove friendship"))?;
        Ok(result.rows_affected() > 0)
    }
}
