//! Feed posts, notifications and friendships in memory.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coastline_core::types::{
    CommunityId, FriendRequestId, NotificationId, PageRequest, PageResponse, PostId, UserId,
};
use coastline_core::{AppError, AppResult};
use coastline_entity::friend::{FriendRequest, FriendRequestStatus, Friendship};
use coastline_entity::notification::{NewNotification, Notification};
use coastline_entity::post::{Post, PostReport};

use super::{MemoryStore, newest_first};
use crate::repository::{FriendRepository, NotificationRepository, PostRepository};

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: &Post) -> AppResult<Post> {
        let mut tables = self.write().await;
        if let Some(parent) = post.parent_id {
            if !tables.posts.contains_key(&parent) {
                return Err(AppError::not_found(format!("Post {parent} not found")));
            }
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn find(&self, id: PostId) -> AppResult<Option<Post>> {
        Ok(self.read().await.posts.get(&id).cloned())
    }

    async fn list_feed(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        let tables = self.read().await;
        let mut rows: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.community_id == community && p.parent_id.is_none())
            .cloned()
            .collect();
        rows.sort_by_key(|p| (Reverse(p.is_pinned), Reverse(p.created_at)));
        let total = rows.len() as u64;
        Ok(PageResponse::new(page.slice(rows), page, total))
    }

    async fn set_pinned(&self, id: PostId, pinned: bool) -> AppResult<Option<Post>> {
        let mut tables = self.write().await;
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.is_pinned = pinned;
            post.clone()
        }))
    }

    async fn delete(&self, id: PostId) -> AppResult<bool> {
        let mut tables = self.write().await;
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.posts.retain(|_, p| p.parent_id != Some(id));
        tables.reports.retain(|r| r.post_id != id);
        Ok(true)
    }

    async fn insert_report(&self, report: &PostReport) -> AppResult<PostReport> {
        let mut tables = self.write().await;
        if !tables.posts.contains_key(&report.post_id) {
            return Err(AppError::not_found(format!("Post {} not found", report.post_id)));
        }
        tables.reports.push(report.clone());
        Ok(report.clone())
    }

    async fn list_reports(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PostReport>> {
        let tables = self.read().await;
        let mut rows: Vec<PostReport> = tables
            .reports
            .iter()
            .filter(|r| r.community_id == community)
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        let total = rows.len() as u64;
        Ok(PageResponse::new(page.slice(rows), page, total))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let row = notification.into_notification(NotificationId::new(), Utc::now());
        self.write().await.notifications.push(row.clone());
        Ok(row)
    }

    async fn latest_for(&self, recipient: UserId, limit: u64) -> AppResult<Vec<Notification>> {
        let tables = self.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient)
            .cloned()
            .collect();
        rows.sort_by_key(|n| Reverse((n.created_at, n.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn unread_count(&self, recipient: UserId) -> AppResult<u64> {
        let tables = self.read().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> AppResult<bool> {
        let mut tables = self.write().await;
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient)
        {
            Some(row) => {
                row.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient: UserId) -> AppResult<u64> {
        let mut tables = self.write().await;
        let mut changed = 0;
        for row in tables
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient && !n.is_read)
        {
            row.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.write().await;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|n| !(n.is_read && n.created_at < cutoff));
        Ok((before - tables.notifications.len()) as u64)
    }
}

#[async_trait]
impl FriendRepository for MemoryStore {
    async fn insert_request(&self, request: &FriendRequest) -> AppResult<FriendRequest> {
        let mut tables = self.write().await;
        tables.friend_requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find_request(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        Ok(self.read().await.friend_requests.get(&id).cloned())
    }

    async fn pending_between(&self, a: UserId, b: UserId) -> AppResult<Option<FriendRequest>> {
        let tables = self.read().await;
        Ok(tables
            .friend_requests
            .values()
            .find(|r| r.status == FriendRequestStatus::Pending && r.connects(a, b))
            .cloned())
    }

    async fn respond(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> AppResult<Option<FriendRequest>> {
        let mut tables = self.write().await;
        match tables.friend_requests.get_mut(&id) {
            Some(req) if req.status == FriendRequestStatus::Pending => {
                req.status = status;
                req.responded_at = Some(Utc::now());
                Ok(Some(req.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_request(&self, id: FriendRequestId) -> AppResult<bool> {
        Ok(self.write().await.friend_requests.remove(&id).is_some())
    }

    async fn incoming(&self, recipient: UserId) -> AppResult<Vec<FriendRequest>> {
        let tables = self.read().await;
        let mut rows: Vec<FriendRequest> = tables
            .friend_requests
            .values()
            .filter(|r| r.recipient_id == recipient && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        Ok(rows)
    }

    async fn outgoing(&self, sender: UserId) -> AppResult<Vec<FriendRequest>> {
        let tables = self.read().await;
        let mut rows: Vec<FriendRequest> = tables
            .friend_requests
            .values()
            .filter(|r| r.sender_id == sender && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        Ok(rows)
    }

    async fn add_friendship(&self, a: UserId, b: UserId) -> AppResult<()> {
        let mut tables = self.write().await;
        let now = Utc::now();
        for (user_id, friend_id) in [(a, b), (b, a)] {
            let exists = tables
                .friendships
                .iter()
                .any(|f| f.user_id == user_id && f.friend_id == friend_id);
            if !exists {
                tables.friendships.push(Friendship {
                    user_id,
                    friend_id,
                    created_at: now,
                });
            }
        }
        Ok(())
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool> {
        let tables = self.read().await;
        Ok(tables
            .friendships
            .iter()
            .any(|f| f.user_id == a && f.friend_id == b))
    }

    async fn friends_of(&self, user: UserId) -> AppResult<Vec<Friendship>> {
        let tables = self.read().await;
        let mut rows: Vec<Friendship> = tables
            .friendships
            .iter()
            .filter(|f| f.user_id == user)
            .cloned()
            .collect();
        newest_first(&mut rows, |f| f.created_at);
        Ok(rows)
    }

    async fn remove_friendship(&self, a: UserId, b: UserId) -> AppResult<bool> {
        let mut tables = self.write().await;
        let before = tables.friendships.len();
        tables.friendships.retain(|f| {
            !((f.user_id == a && f.friend_id == b) || (f.user_id == b && f.friend_id == a))
        });
        Ok(tables.friendships.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use coastline_core::types::ReportId;
    use coastline_entity::notification::NotificationKind;
    use coastline_entity::post::PostType;

    fn post(community: CommunityId, parent: Option<PostId>) -> Post {
        Post {
            id: PostId::new(),
            user_id: UserId::new(),
            community_id: community,
            post_type: if parent.is_some() { PostType::Comment } else { PostType::General },
            content: "Low tide at six".to_string(),
            image_files: vec![],
            video_url: None,
            file_urls: vec![],
            parent_id: parent,
            is_pinned: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_feed_lists_pinned_first_without_comments() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let older = post(community, None);
        let mut newer = post(community, None);
        newer.created_at = older.created_at + Duration::seconds(5);
        PostRepository::insert(&store, &older).await.unwrap();
        PostRepository::insert(&store, &newer).await.unwrap();
        PostRepository::insert(&store, &post(community, Some(older.id))).await.unwrap();

        store.set_pinned(older.id, true).await.unwrap();
        let feed = store.list_feed(community, PageRequest::default()).await.unwrap();
        let ids: Vec<PostId> = feed.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_delete_cascades_comments_and_reports() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let root = post(community, None);
        let comment = post(community, Some(root.id));
        PostRepository::insert(&store, &root).await.unwrap();
        PostRepository::insert(&store, &comment).await.unwrap();
        store
            .insert_report(&PostReport {
                id: ReportId::new(),
                post_id: root.id,
                reporter_id: UserId::new(),
                community_id: community,
                reason: "spam".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(PostRepository::delete(&store, root.id).await.unwrap());
        assert!(PostRepository::find(&store, comment.id).await.unwrap().is_none());
        let reports = store.list_reports(community, PageRequest::default()).await.unwrap();
        assert_eq!(reports.total_items, 0);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_recipient() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let row = NotificationRepository::insert(
            &store,
            NewNotification::new(owner, NotificationKind::Like),
        )
        .await
        .unwrap();

        assert!(!store.mark_read(UserId::new(), row.id).await.unwrap());
        assert_eq!(store.unread_count(owner).await.unwrap(), 1);
        assert!(store.mark_read(owner, row.id).await.unwrap());
        assert_eq!(store.unread_count(owner).await.unwrap(), 0);

        let purged = store
            .purge_read_before(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(purged, 1);
    }

    #[tokio::test]
    async fn test_respond_only_once() {
        let store = MemoryStore::new();
        let request = FriendRequest {
            id: FriendRequestId::new(),
            sender_id: UserId::new(),
            recipient_id: UserId::new(),
            status: FriendRequestStatus::Pending,
            reason: None,
            created_at: Utc::now(),
            responded_at: None,
        };
        store.insert_request(&request).await.unwrap();

        let first = store
            .respond(request.id, FriendRequestStatus::Accepted)
            .await
            .unwrap();
        assert!(first.is_some());
        let second = store
            .respond(request.id, FriendRequestStatus::Rejected)
            .await
            .unwrap();
        assert!(second.is_none());

        store
            .add_friendship(request.sender_id, request.recipient_id)
            .await
            .unwrap();
        assert!(store.are_friends(request.recipient_id, request.sender_id).await.unwrap());
        assert!(store
            .remove_friendship(request.recipient_id, request.sender_id)
            .await
            .unwrap());
        assert!(!store.are_friends(request.sender_id, request.recipient_id).await.unwrap());
    }
}
