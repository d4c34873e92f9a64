//! Feed post and report entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, PostId, ReportId, UserId};

/// Kind of feed post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    General,
    Ask,
    Announce,
    Event,
    Poll,
    Comment,
}

text_enum!(PostType {
    General => "general",
    Ask => "ask",
    Announce => "announce",
    Event => "event",
    Poll => "poll",
    Comment => "comment",
});

impl PostType {
    /// Announcements are reserved for community admins.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Announce)
    }
}

/// A row of the `posts` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub content: String,
    pub image_files: Vec<String>,
    pub video_url: Option<String>,
    pub file_urls: Vec<String>,
    /// Parent post for comments.
    pub parent_id: Option<PostId>,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's report against a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostReport {
    pub id: ReportId,
    pub post_id: PostId,
    pub reporter_id: UserId,
    pub community_id: CommunityId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
