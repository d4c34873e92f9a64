//! Friend request and friendship entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{FriendRequestId, UserId};
use coastline_core::{AppError, AppResult};

/// State of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

text_enum!(FriendRequestStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

/// A row of the `friend_requests` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub status: FriendRequestStatus,
    /// Optional note from the sender.
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    /// Check that `responder` may answer this request.
    pub fn ensure_answerable_by(&self, responder: UserId) -> AppResult<()> {
        if self.recipient_id != responder {
            return Err(AppError::authorization(
                "Only the recipient can respond to a friend request",
            ));
        }
        if self.status != FriendRequestStatus::Pending {
            return Err(AppError::conflict(format!(
                "Friend request is already {}",
                self.status
            )));
        }
        Ok(())
    }

    /// Whether the request connects `a` and `b` in either direction.
    pub fn connects(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.recipient_id == b)
            || (self.sender_id == b && self.recipient_id == a)
    }
}

/// One direction of a friendship; both directions are stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: FriendRequestStatus) -> FriendRequest {
        FriendRequest {
            id: FriendRequestId::new(),
            sender_id: UserId::new(),
            recipient_id: UserId::new(),
            status,
            reason: None,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    #[test]
    fn test_only_recipient_can_answer_pending() {
        let req = request(FriendRequestStatus::Pending);
        assert!(req.ensure_answerable_by(req.recipient_id).is_ok());
        assert!(req.ensure_answerable_by(req.sender_id).is_err());

        let done = request(FriendRequestStatus::Accepted);
        assert!(done.ensure_answerable_by(done.recipient_id).is_err());
    }

    #[test]
    fn test_connects_is_symmetric() {
        let req = request(FriendRequestStatus::Pending);
        assert!(req.connects(req.sender_id, req.recipient_id));
        assert!(req.connects(req.recipient_id, req.sender_id));
        assert!(!req.connects(req.sender_id, UserId::new()));
    }
}
