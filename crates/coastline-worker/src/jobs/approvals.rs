//! Pending-approvals poll.
//!
//! Counts pending rows per community and tells the community's admins
//! when the total has grown since the previous poll. A community missing
//! from earlier polls counts as having had nothing pending.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use coastline_core::AppResult;
use coastline_core::types::CommunityId;
use coastline_database::repository::{ApprovalRepository, ProfileRepository};
use coastline_entity::notification::{NewNotification, NotificationKind, TargetType};
use coastline_service::NotificationCenter;

use crate::task::PeriodicTask;

pub struct PendingApprovalsTask {
    approvals: Arc<dyn ApprovalRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: Arc<NotificationCenter>,
    interval: Duration,
    /// Pending total per community at the previous poll.
    last_totals: DashMap<CommunityId, u64>,
    baseline_taken: AtomicBool,
}

impl PendingApprovalsTask {
    pub fn new(
        approvals: Arc<dyn ApprovalRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: Arc<NotificationCenter>,
        interval: Duration,
    ) -> Self {
        Self {
            approvals,
            profiles,
            notifications,
            interval,
            last_totals: DashMap::new(),
            baseline_taken: AtomicBool::new(false),
        }
    }

    /// Run one poll. Returns the communities whose admins were notified.
    ///
    /// The first successful poll only records a baseline.
    pub async fn poll(&self) -> AppResult<Vec<CommunityId>> {
        let mut current: HashMap<CommunityId, u64> = HashMap::new();
        for row in self.approvals.pending_totals().await? {
            *current.entry(row.community_id).or_default() += row.pending;
        }
        let baseline = !self.baseline_taken.swap(true, Ordering::SeqCst);

        // communities that dropped out of the totals are back to zero
        for mut entry in self.last_totals.iter_mut() {
            if !current.contains_key(entry.key()) {
                *entry.value_mut() = 0;
            }
        }

        let mut grown = Vec::new();
        for (&community, &total) in &current {
            let previous = self.last_totals.insert(community, total).unwrap_or(0);
            if !baseline && total > previous {
                grown.push(community);
            }
        }

        for &community in &grown {
            let total = current.get(&community).copied().unwrap_or_default();
            let admins = self.profiles.community_admins(community).await?;
            let label = if total == 1 { "1 item".to_string() } else { format!("{total} items") };
            let batch = admins
                .into_iter()
                .map(|admin| {
                    NewNotification::new(admin.id, NotificationKind::PendingApprovals)
                        .target(TargetType::Community, community)
                        .community(community)
                        .snippet(&label)
                })
                .collect();
            let sent = self.notifications.deliver_all(batch).await;
            info!(community_id = %community, pending = total, notified = sent, "Pending approvals grew");
        }

        debug!(communities = current.len(), "Pending approvals polled");
        Ok(grown)
    }
}

#[async_trait]
impl PeriodicTask for PendingApprovalsTask {
    fn name(&self) -> &'static str {
        "pending_approvals"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_once(&self) -> AppResult<()> {
        self.poll().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coastline_core::config::notifications::NotificationsConfig;
    use coastline_core::types::UserId;
    use coastline_database::Database;
    use coastline_core::types::PageRequest;
    use coastline_entity::approval::{ApprovalKind, ApprovalStatus, Decision};
    use coastline_entity::community::Community;
    use coastline_entity::profile::{Profile, ProfileRole};
    use coastline_entity::property::{ListingType, PropertyDraft};

    fn profile(role: ProfileRole, community: CommunityId, username: &str) -> Profile {
        Profile {
            id: UserId::new(),
            username: username.to_string(),
            full_name: None,
            email: None,
            role,
            community_id: Some(community),
            approval_status: ApprovalStatus::Approved,
            is_location_verified: false,
            avatar_url: None,
            business_name: None,
            created_at: Utc::now(),
        }
    }

    fn draft() -> PropertyDraft {
        PropertyDraft {
            title: "Fisherman's cottage".into(),
            description: None,
            price: 700.0,
            listing_type: ListingType::Rent,
            location: None,
            bedrooms: None,
            bathrooms: None,
            image_files: vec![],
            video_url: None,
        }
    }

    struct Harbour {
        db: Database,
        community: CommunityId,
        admin: Profile,
        owner: Profile,
        center: Arc<NotificationCenter>,
        task: PendingApprovalsTask,
    }

    async fn harbour() -> Harbour {
        let db = Database::in_memory();
        let community = db
            .communities
            .insert(&Community {
                id: CommunityId::new(),
                name: "Seal Cove".into(),
                slug: "seal-cove".into(),
                description: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let admin = db
            .profiles
            .insert(&profile(ProfileRole::CommunityAdmin, community.id, "harbourmaster"))
            .await
            .unwrap();
        let owner = db
            .profiles
            .insert(&profile(ProfileRole::Resident, community.id, "skipper"))
            .await
            .unwrap();
        let center = Arc::new(NotificationCenter::new(
            db.notifications.clone(),
            db.profiles.clone(),
            &NotificationsConfig::default(),
        ));
        let task = PendingApprovalsTask::new(
            db.approvals.clone(),
            db.profiles.clone(),
            center.clone(),
            Duration::from_secs(10),
        );
        Harbour {
            db,
            community: community.id,
            admin,
            owner,
            center,
            task,
        }
    }

    impl Harbour {
        async fn list_property(&self) {
            self.db
                .properties
                .insert(&draft().into_property(self.owner.id, self.community))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_admins_notified_when_queue_grows() {
        let h = harbour().await;

        h.list_property().await;
        assert!(h.task.poll().await.unwrap().is_empty());

        h.list_property().await;
        assert_eq!(h.task.poll().await.unwrap(), vec![h.community]);
        assert!(h.task.poll().await.unwrap().is_empty());

        let snapshot = h.center.snapshot(h.admin.id).await.unwrap();
        assert_eq!(snapshot.unread_count, 1);
        assert_eq!(
            snapshot.notifications[0].message,
            "2 items waiting for review"
        );
    }

    #[tokio::test]
    async fn test_first_pending_item_after_empty_queue_notifies() {
        let h = harbour().await;
        assert!(h.task.poll().await.unwrap().is_empty());

        h.list_property().await;
        assert_eq!(h.task.poll().await.unwrap(), vec![h.community]);

        let snapshot = h.center.snapshot(h.admin.id).await.unwrap();
        assert_eq!(snapshot.unread_count, 1);
        assert_eq!(snapshot.notifications[0].message, "1 item waiting for review");
    }

    #[tokio::test]
    async fn test_queue_refilled_after_draining_notifies() {
        let h = harbour().await;
        h.list_property().await;
        assert!(h.task.poll().await.unwrap().is_empty());

        let pending = h
            .db
            .approvals
            .list_pending(h.community, ApprovalKind::Property, PageRequest::default())
            .await
            .unwrap();
        h.db.approvals
            .decide(h.community, ApprovalKind::Property, pending.items[0].id, Decision::Approve)
            .await
            .unwrap();
        assert!(h.task.poll().await.unwrap().is_empty());

        h.list_property().await;
        assert_eq!(h.task.poll().await.unwrap(), vec![h.community]);
    }
}
