//! Community feed: posts, comments, pins and reports.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use coastline_auth::Action;
use coastline_core::types::{CommunityId, PageRequest, PageResponse, PostId, ReportId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{PostRepository, ProfileRepository};
use coastline_entity::notification::{NewNotification, NotificationKind, TargetType};
use coastline_entity::post::{Post, PostReport, PostType};

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

const CONTENT_MAX_CHARS: usize = 5000;

/// A post or comment as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    /// Only honoured for superadmins; others post to their own community.
    #[serde(default)]
    pub community_id: Option<CommunityId>,
    #[serde(rename = "type", default = "default_post_type")]
    pub post_type: PostType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_files: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub file_urls: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<PostId>,
}

fn default_post_type() -> PostType {
    PostType::General
}

impl NewPost {
    fn has_media(&self) -> bool {
        !self.image_files.is_empty() || self.video_url.is_some() || !self.file_urls.is_empty()
    }
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: Arc<NotificationCenter>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            posts,
            profiles,
            notifications,
        }
    }

    /// Publish a post, or a comment when `parent_id` is set.
    pub async fn create_post(&self, ctx: &RequestContext, new: NewPost) -> AppResult<Post> {
        let community = ctx.target_community(new.community_id)?;
        ctx.require(Action::Contribute, community)?;
        if new.post_type.requires_admin() {
            ctx.require(Action::Announce, community)?;
        }

        let content = new.content.trim();
        if content.is_empty() && !new.has_media() {
            return Err(AppError::validation("A post needs text or an attachment"));
        }
        if content.chars().count() > CONTENT_MAX_CHARS {
            return Err(AppError::validation(format!(
                "Posts are limited to {CONTENT_MAX_CHARS} characters"
            )));
        }

        let parent = match new.parent_id {
            Some(parent_id) => {
                let parent = self.find(parent_id).await?;
                if parent.community_id != community {
                    return Err(AppError::validation("Cannot comment across communities"));
                }
                Some(parent)
            }
            None => None,
        };

        let post = Post {
            id: PostId::new(),
            user_id: ctx.user_id(),
            community_id: community,
            post_type: if parent.is_some() { PostType::Comment } else { new.post_type },
            content: content.to_string(),
            image_files: new.image_files,
            video_url: new.video_url,
            file_urls: new.file_urls,
            parent_id: new.parent_id,
            is_pinned: false,
            created_at: Utc::now(),
        };
        let post = self.posts.insert(&post).await?;
        info!(
            post_id = %post.id,
            user_id = %post.user_id,
            community_id = %community,
            post_type = %post.post_type,
            "Post published"
        );

        if let Some(parent) = parent.filter(|p| p.user_id != ctx.user_id()) {
            self.notifications
                .deliver(
                    NewNotification::new(parent.user_id, NotificationKind::Comment)
                        .actor(ctx.user_id())
                        .target(TargetType::Post, parent.id)
                        .community(community)
                        .snippet(&post.content),
                )
                .await;
        }
        Ok(post)
    }

    /// Top-level posts, pinned first then newest.
    pub async fn list_feed(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        if !ctx.profile.belongs_to(community) && !ctx.administers(community) {
            return Err(AppError::authorization("You are not a member of this community"));
        }
        self.posts.list_feed(community, page).await
    }

    /// Pin or unpin. The author is told when their post gets pinned.
    pub async fn set_pinned(&self, ctx: &RequestContext, id: PostId, pinned: bool) -> AppResult<Post> {
        let post = self.find(id).await?;
        ctx.require(Action::ModerateFeed, post.community_id)?;

        let updated = self
            .posts
            .set_pinned(id, pinned)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(post_id = %id, pinned, admin_id = %ctx.user_id(), "Post pin changed");

        if pinned && !post.is_pinned && post.user_id != ctx.user_id() {
            self.notifications
                .deliver(
                    NewNotification::new(post.user_id, NotificationKind::PostPinned)
                        .actor(ctx.user_id())
                        .target(TargetType::Post, id)
                        .community(post.community_id)
                        .snippet(&post.content),
                )
                .await;
        }
        Ok(updated)
    }

    pub async fn pin(&self, ctx: &RequestContext, id: PostId) -> AppResult<Post> {
        self.set_pinned(ctx, id, true).await
    }

    pub async fn unpin(&self, ctx: &RequestContext, id: PostId) -> AppResult<Post> {
        self.set_pinned(ctx, id, false).await
    }

    /// Remove a post with its comments. Authors and admins may do this.
    pub async fn delete_post(&self, ctx: &RequestContext, id: PostId) -> AppResult<()> {
        let post = self.find(id).await?;
        if post.user_id != ctx.user_id() {
            ctx.require(Action::RemoveContent, post.community_id)?;
        }
        if !self.posts.delete(id).await? {
            return Err(not_found(id));
        }
        info!(post_id = %id, user_id = %ctx.user_id(), "Post deleted");
        Ok(())
    }

    /// File a report and alert the community's admins.
    pub async fn report_post(
        &self,
        ctx: &RequestContext,
        id: PostId,
        reason: &str,
    ) -> AppResult<PostReport> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("A reason is required"));
        }
        let post = self.find(id).await?;
        ctx.require(Action::Contribute, post.community_id)?;

        let report = self
            .posts
            .insert_report(&PostReport {
                id: ReportId::new(),
                post_id: id,
                reporter_id: ctx.user_id(),
                community_id: post.community_id,
                reason: reason.to_string(),
                created_at: Utc::now(),
            })
            .await?;
        info!(report_id = %report.id, post_id = %id, "Post reported");

        let admins = self.profiles.community_admins(post.community_id).await?;
        let batch = admins
            .into_iter()
            .filter(|a| a.id != ctx.user_id())
            .map(|a| {
                NewNotification::new(a.id, NotificationKind::PostReported)
                    .actor(ctx.user_id())
                    .target(TargetType::Post, id)
                    .community(post.community_id)
                    .snippet(reason)
            })
            .collect();
        self.notifications.deliver_all(batch).await;
        Ok(report)
    }

    pub async fn list_reports(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PostReport>> {
        ctx.require(Action::ModerateFeed, community)?;
        self.posts.list_reports(community, page).await
    }

    async fn find(&self, id: PostId) -> AppResult<Post> {
        self.posts.find(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: PostId) -> AppError {
    AppError::not_found(format!("Post {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, admin, ctx, resident};
    use coastline_core::error::ErrorKind;

    fn text(content: &str) -> NewPost {
        NewPost {
            community_id: None,
            post_type: PostType::General,
            content: content.to_string(),
            image_files: vec![],
            video_url: None,
            file_urls: vec![],
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_pinned_posts_lead_the_feed() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = FeedService::new(fx.db.posts.clone(), fx.db.profiles.clone(), center.clone());
        let author = ctx(&fx.add(resident(fx.community.id)).await);
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);

        let older = svc.create_post(&author, text("Lost dog near the pier")).await.unwrap();
        svc.create_post(&author, text("Beach clean on Sunday")).await.unwrap();
        svc.pin(&moderator, older.id).await.unwrap();

        let feed = svc
            .list_feed(&author, fx.community.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(feed.items[0].id, older.id);

        let snapshot = center.snapshot(author.user_id()).await.unwrap();
        assert_eq!(snapshot.notifications[0].notification.kind, NotificationKind::PostPinned);
    }

    #[tokio::test]
    async fn test_announcements_need_admin() {
        let fx = Fixture::new().await;
        let svc = FeedService::new(fx.db.posts.clone(), fx.db.profiles.clone(), fx.notifications());
        let author = ctx(&fx.add(resident(fx.community.id)).await);
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);

        let mut announcement = text("Road closed");
        announcement.post_type = PostType::Announce;
        let err = svc.create_post(&author, announcement.clone()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(svc.create_post(&moderator, announcement).await.is_ok());
    }

    #[tokio::test]
    async fn test_report_reaches_admins() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = FeedService::new(fx.db.posts.clone(), fx.db.profiles.clone(), center.clone());
        let author = ctx(&fx.add(resident(fx.community.id)).await);
        let reporter = ctx(&fx.add(resident(fx.community.id)).await);
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);

        let post = svc.create_post(&author, text("Buy my timeshare")).await.unwrap();
        svc.report_post(&reporter, post.id, "spam").await.unwrap();

        let snapshot = center.snapshot(moderator.user_id()).await.unwrap();
        assert_eq!(snapshot.unread_count, 1);
        let reports = svc
            .list_reports(&moderator, fx.community.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(reports.items[0].reason, "spam");

        let err = svc
            .list_reports(&reporter, fx.community.id, PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_only_author_or_admin_deletes() {
        let fx = Fixture::new().await;
        let svc = FeedService::new(fx.db.posts.clone(), fx.db.profiles.clone(), fx.notifications());
        let author = ctx(&fx.add(resident(fx.community.id)).await);
        let other = ctx(&fx.add(resident(fx.community.id)).await);
        let post = svc.create_post(&author, text("Kayaks for hire")).await.unwrap();

        let mut comment = text("How much?");
        comment.parent_id = Some(post.id);
        let comment = svc.create_post(&other, comment).await.unwrap();
        assert_eq!(comment.post_type, PostType::Comment);

        let err = svc.delete_post(&other, post.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        svc.delete_post(&author, post.id).await.unwrap();
        assert!(fx.db.posts.find(comment.id).await.unwrap().is_none());
    }
}
