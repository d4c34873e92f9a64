//! Notification center: per-user snapshots, read state, and delivery.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info, warn};

use coastline_core::config::notifications::NotificationsConfig;
use coastline_core::types::{NotificationId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{NotificationRepository, ProfileRepository};
use coastline_entity::notification::{NewNotification, Notification, NotificationView};

/// Upper bound on notifications stored concurrently by one batch delivery.
pub const DELIVERY_CONCURRENCY: usize = 16;

/// The latest notifications of one user, rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSnapshot {
    pub notifications: Vec<NotificationView>,
    pub unread_count: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Reads and writes notifications, caching each user's snapshot.
///
/// Every write that affects a user drops that user's cached snapshot, so
/// the next read reflects it.
pub struct NotificationCenter {
    repo: Arc<dyn NotificationRepository>,
    profiles: Arc<dyn ProfileRepository>,
    cache: Cache<UserId, Arc<NotificationSnapshot>>,
    snapshot_size: u64,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("snapshot_size", &self.snapshot_size)
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl NotificationCenter {
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        profiles: Arc<dyn ProfileRepository>,
        config: &NotificationsConfig,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();
        Self {
            repo,
            profiles,
            cache,
            snapshot_size: config.snapshot_size.max(1),
        }
    }

    /// Latest notifications and unread count, newest first.
    pub async fn snapshot(&self, user: UserId) -> AppResult<Arc<NotificationSnapshot>> {
        if let Some(cached) = self.cache.get(&user).await {
            return Ok(cached);
        }
        let snapshot = Arc::new(self.load(user).await?);
        self.cache.insert(user, snapshot.clone()).await;
        Ok(snapshot)
    }

    async fn load(&self, user: UserId) -> AppResult<NotificationSnapshot> {
        let rows = self.repo.latest_for(user, self.snapshot_size).await?;
        let unread_count = self.repo.unread_count(user).await?;
        let names = self.actor_names(&rows).await?;

        let notifications = rows
            .into_iter()
            .map(|n| {
                let actor = n.actor_id.and_then(|id| names.get(&id)).map(String::as_str);
                n.render(actor)
            })
            .collect();

        debug!(user_id = %user, unread_count, "Loaded notification snapshot");
        Ok(NotificationSnapshot {
            notifications,
            unread_count,
            loaded_at: Utc::now(),
        })
    }

    async fn actor_names(&self, rows: &[Notification]) -> AppResult<HashMap<UserId, String>> {
        let ids: Vec<UserId> = rows
            .iter()
            .filter_map(|n| n.actor_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let profiles = self.profiles.find_many(&ids).await?;
        Ok(profiles
            .into_iter()
            .map(|p| (p.id, p.display_name().to_string()))
            .collect())
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_as_read(&self, user: UserId, id: NotificationId) -> AppResult<()> {
        if !self.repo.mark_read(user, id).await? {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        self.cache.invalidate(&user).await;
        Ok(())
    }

    /// Mark every notification of the user as read. Returns rows changed.
    pub async fn mark_all_as_read(&self, user: UserId) -> AppResult<u64> {
        let changed = self.repo.mark_all_read(user).await?;
        self.cache.invalidate(&user).await;
        info!(user_id = %user, changed, "Marked all notifications read");
        Ok(changed)
    }

    /// Snapshot entries the client has not shown yet.
    pub async fn unseen(
        &self,
        user: UserId,
        seen: &[NotificationId],
    ) -> AppResult<Vec<NotificationView>> {
        let seen: HashSet<NotificationId> = seen.iter().copied().collect();
        let snapshot = self.snapshot(user).await?;
        Ok(snapshot
            .notifications
            .iter()
            .filter(|v| !seen.contains(&v.notification.id))
            .cloned()
            .collect())
    }

    /// Store a notification and drop the recipient's snapshot.
    pub async fn notify(&self, notification: NewNotification) -> AppResult<Notification> {
        let recipient = notification.recipient_id;
        let stored = self.repo.insert(notification).await?;
        self.cache.invalidate(&recipient).await;
        debug!(
            recipient = %recipient,
            kind = %stored.kind,
            "Notification stored"
        );
        Ok(stored)
    }

    /// Like [`notify`](Self::notify), but a failure is logged instead of
    /// returned. Used after the triggering write has already committed.
    pub async fn deliver(&self, notification: NewNotification) -> bool {
        let recipient = notification.recipient_id;
        let kind = notification.kind;
        match self.notify(notification).await {
            Ok(_) => true,
            Err(e) => {
                warn!(recipient = %recipient, %kind, error = %e, "Failed to deliver notification");
                false
            }
        }
    }

    /// Deliver a batch, at most [`DELIVERY_CONCURRENCY`] at a time.
    /// Returns how many were stored.
    pub async fn deliver_all(&self, notifications: Vec<NewNotification>) -> usize {
        stream::iter(notifications)
            .map(|n| self.deliver(n))
            .buffer_unordered(DELIVERY_CONCURRENCY)
            .fold(0, |stored, ok| async move { stored + usize::from(ok) })
            .await
    }

    /// Drop a cached snapshot without writing.
    pub async fn invalidate(&self, user: UserId) {
        self.cache.invalidate(&user).await;
    }

    /// Delete read notifications created before `cutoff`. Cached snapshots
    /// are dropped when anything was removed.
    pub async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let removed = self.repo.purge_read_before(cutoff).await?;
        if removed > 0 {
            self.cache.invalidate_all();
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use crate::testing::{Fixture, resident};
    use coastline_core::config::notifications::NotificationsConfig;
    use coastline_core::error::ErrorKind;
    use coastline_entity::notification::{NotificationKind, TargetType};

    /// Records how many inserts are in flight at once.
    struct CountingRepo {
        inner: Arc<dyn NotificationRepository>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl NotificationRepository for CountingRepo {
        async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            let stored = self.inner.insert(notification).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            stored
        }

        async fn latest_for(&self, recipient: UserId, limit: u64) -> AppResult<Vec<Notification>> {
            self.inner.latest_for(recipient, limit).await
        }

        async fn unread_count(&self, recipient: UserId) -> AppResult<u64> {
            self.inner.unread_count(recipient).await
        }

        async fn mark_read(&self, recipient: UserId, id: NotificationId) -> AppResult<bool> {
            self.inner.mark_read(recipient, id).await
        }

        async fn mark_all_read(&self, recipient: UserId) -> AppResult<u64> {
            self.inner.mark_all_read(recipient).await
        }

        async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
            self.inner.purge_read_before(cutoff).await
        }
    }

    #[tokio::test]
    async fn test_snapshot_renders_actor_and_link() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let seller = fx.add(resident(fx.community.id)).await;
        let mut buyer = resident(fx.community.id);
        buyer.full_name = Some("Marin Gale".to_string());
        let buyer = fx.add(buyer).await;

        let listing = uuid::Uuid::new_v4();
        center
            .notify(
                NewNotification::new(seller.id, NotificationKind::PropertyInquiry)
                    .actor(buyer.id)
                    .target(TargetType::Property, listing)
                    .snippet("Is the cottage still free?"),
            )
            .await
            .unwrap();

        let snapshot = center.snapshot(seller.id).await.unwrap();
        assert_eq!(snapshot.unread_count, 1);
        let view = &snapshot.notifications[0];
        assert!(view.message.contains("Marin Gale"));
        assert_eq!(view.link, format!("/properties/{listing}"));
    }

    #[tokio::test]
    async fn test_writes_invalidate_snapshot() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let user = fx.add(resident(fx.community.id)).await;

        assert_eq!(center.snapshot(user.id).await.unwrap().unread_count, 0);
        let first = center
            .notify(NewNotification::new(user.id, NotificationKind::System).snippet("Welcome"))
            .await
            .unwrap();
        center
            .notify(NewNotification::new(user.id, NotificationKind::System).snippet("Tides"))
            .await
            .unwrap();
        assert_eq!(center.snapshot(user.id).await.unwrap().unread_count, 2);

        center.mark_as_read(user.id, first.id).await.unwrap();
        assert_eq!(center.snapshot(user.id).await.unwrap().unread_count, 1);

        assert_eq!(center.mark_all_as_read(user.id).await.unwrap(), 1);
        assert_eq!(center.snapshot(user.id).await.unwrap().unread_count, 0);
    }

    #[tokio::test]
    async fn test_mark_foreign_notification_is_not_found() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let owner = fx.add(resident(fx.community.id)).await;
        let other = fx.add(resident(fx.community.id)).await;
        let n = center
            .notify(NewNotification::new(owner.id, NotificationKind::System))
            .await
            .unwrap();

        let err = center.mark_as_read(other.id, n.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unseen_diff() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let user = fx.add(resident(fx.community.id)).await;
        let old = center
            .notify(NewNotification::new(user.id, NotificationKind::System))
            .await
            .unwrap();
        let new = center
            .notify(NewNotification::new(user.id, NotificationKind::Like))
            .await
            .unwrap();

        let unseen = center.unseen(user.id, &[old.id]).await.unwrap();
        assert_eq!(unseen.len(), 1);
        assert_eq!(unseen[0].notification.id, new.id);
    }

    #[tokio::test]
    async fn test_deliver_all_bounds_concurrent_inserts() {
        let fx = Fixture::new().await;
        let repo = Arc::new(CountingRepo {
            inner: fx.db.notifications.clone(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let center = NotificationCenter::new(
            repo.clone(),
            fx.db.profiles.clone(),
            &NotificationsConfig::default(),
        );
        let user = fx.add(resident(fx.community.id)).await;
        let batch = (0..DELIVERY_CONCURRENCY * 3)
            .map(|_| NewNotification::new(user.id, NotificationKind::CommunityAlert))
            .collect();

        let stored = center.deliver_all(batch).await;

        assert_eq!(stored, DELIVERY_CONCURRENCY * 3);
        assert!(repo.peak.load(Ordering::SeqCst) <= DELIVERY_CONCURRENCY);
        assert_eq!(repo.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(
            center.snapshot(user.id).await.unwrap().unread_count,
            (DELIVERY_CONCURRENCY * 3) as u64
        );
    }

    #[tokio::test]
    async fn test_purge_drops_cached_snapshots() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let user = fx.add(resident(fx.community.id)).await;
        center
            .notify(NewNotification::new(user.id, NotificationKind::System).snippet("Old news"))
            .await
            .unwrap();
        center.mark_all_as_read(user.id).await.unwrap();
        assert_eq!(center.snapshot(user.id).await.unwrap().notifications.len(), 1);

        let removed = center
            .purge_read_before(Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(center.snapshot(user.id).await.unwrap().notifications.is_empty());
    }

    #[tokio::test]
    async fn test_purge_keeps_unread() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let user = fx.add(resident(fx.community.id)).await;
        center
            .notify(NewNotification::new(user.id, NotificationKind::System))
            .await
            .unwrap();

        let removed = center
            .purge_read_before(Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        assert_eq!(removed, 0);
        assert_eq!(center.snapshot(user.id).await.unwrap().unread_count, 1);
    }
}
