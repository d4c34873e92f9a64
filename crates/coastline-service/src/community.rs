//! Communities, their access reports and alerts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use coastline_auth::{AccessReport, Action, Policy};
use coastline_core::types::{AlertId, CommunityId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{AlertRepository, CommunityRepository, ProfileRepository};
use coastline_entity::community::{AlertSeverity, Community, CommunityAlert};
use coastline_entity::notification::{NewNotification, NotificationKind, TargetType};

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

/// An alert as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAlert {
    pub title: String,
    pub message: String,
    #[serde(default = "default_severity")]
    pub severity: AlertSeverity,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_severity() -> AlertSeverity {
    AlertSeverity::Info
}

#[derive(Clone)]
pub struct CommunityService {
    communities: Arc<dyn CommunityRepository>,
    alerts: Arc<dyn AlertRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: Arc<NotificationCenter>,
}

impl CommunityService {
    pub fn new(
        communities: Arc<dyn CommunityRepository>,
        alerts: Arc<dyn AlertRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            communities,
            alerts,
            profiles,
            notifications,
        }
    }

    pub async fn get(&self, id: CommunityId) -> AppResult<Community> {
        self.communities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Community {id} not found")))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Community> {
        self.communities
            .find_by_slug(slug.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Community '{slug}' not found")))
    }

    pub async fn list(&self) -> AppResult<Vec<Community>> {
        self.communities.list().await
    }

    /// What the caller may do in `community`.
    pub async fn access(&self, ctx: &RequestContext, community: CommunityId) -> AppResult<AccessReport> {
        self.get(community).await?;
        Ok(Policy::access_report(&ctx.actor, community))
    }

    /// Post an alert and notify every approved member.
    pub async fn create_alert(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        new: NewAlert,
    ) -> AppResult<CommunityAlert> {
        ctx.require(Action::CreateAlert, community)?;
        let title = new.title.trim();
        let message = new.message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(AppError::validation("Alerts need a title and a message"));
        }
        if new.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(AppError::validation("Expiry must be in the future"));
        }

        let alert = self
            .alerts
            .insert(&CommunityAlert {
                id: AlertId::new(),
                community_id: community,
                author_id: ctx.user_id(),
                title: title.to_string(),
                message: message.to_string(),
                severity: new.severity,
                created_at: Utc::now(),
                expires_at: new.expires_at,
            })
            .await?;

        let members = match self.profiles.approved_members(community).await {
            Ok(members) => members,
            Err(e) => {
                warn!(
                    alert_id = %alert.id,
                    community_id = %community,
                    error = %e,
                    "Failed to list alert recipients"
                );
                Vec::new()
            }
        };
        let batch = members
            .into_iter()
            .filter(|m| m.id != ctx.user_id())
            .map(|m| {
                NewNotification::new(m.id, NotificationKind::CommunityAlert)
                    .actor(ctx.user_id())
                    .target(TargetType::Community, community)
                    .community(community)
                    .snippet(&alert.title)
            })
            .collect();
        let notified = self.notifications.deliver_all(batch).await;
        info!(
            alert_id = %alert.id,
            community_id = %community,
            severity = %alert.severity,
            notified,
            "Community alert posted"
        );
        Ok(alert)
    }

    pub async fn active_alerts(&self, community: CommunityId) -> AppResult<Vec<CommunityAlert>> {
        self.alerts.active(community, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, admin, ctx, pending_resident, resident};
    use async_trait::async_trait;
    use coastline_core::error::ErrorKind;
    use coastline_core::types::UserId;
    use coastline_entity::profile::{Profile, ProfileUpdate};

    /// Profile store whose member listing is down.
    struct MembersUnavailable(Arc<dyn ProfileRepository>);

    #[async_trait]
    impl ProfileRepository for MembersUnavailable {
        async fn find_by_id(&self, id: UserId) -> AppResult<Option<Profile>> {
            self.0.find_by_id(id).await
        }

        async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<Profile>> {
            self.0.find_many(ids).await
        }

        async fn insert(&self, profile: &Profile) -> AppResult<Profile> {
            self.0.insert(profile).await
        }

        async fn update(&self, id: UserId, update: &ProfileUpdate) -> AppResult<Option<Profile>> {
            self.0.update(id, update).await
        }

        async fn delete(&self, id: UserId) -> AppResult<bool> {
            self.0.delete(id).await
        }

        async fn community_admins(&self, community: CommunityId) -> AppResult<Vec<Profile>> {
            self.0.community_admins(community).await
        }

        async fn approved_members(&self, _community: CommunityId) -> AppResult<Vec<Profile>> {
            Err(AppError::database("connection reset"))
        }
    }

    fn alert(title: &str) -> NewAlert {
        NewAlert {
            title: title.to_string(),
            message: "Stay off the causeway".to_string(),
            severity: AlertSeverity::Urgent,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_alert_fans_out_to_approved_members() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = CommunityService::new(
            fx.db.communities.clone(),
            fx.db.alerts.clone(),
            fx.db.profiles.clone(),
            center.clone(),
        );
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);
        let member = fx.add(resident(fx.community.id)).await;
        let waiting = fx.add(pending_resident(fx.community.id)).await;

        svc.create_alert(&moderator, fx.community.id, alert("Storm surge"))
            .await
            .unwrap();

        assert_eq!(center.snapshot(member.id).await.unwrap().unread_count, 1);
        assert_eq!(center.snapshot(waiting.id).await.unwrap().unread_count, 0);
        assert_eq!(svc.active_alerts(fx.community.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_alert_is_kept_when_recipient_lookup_fails() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = CommunityService::new(
            fx.db.communities.clone(),
            fx.db.alerts.clone(),
            Arc::new(MembersUnavailable(fx.db.profiles.clone())),
            center.clone(),
        );
        let moderator = ctx(&fx.add(admin(fx.community.id)).await);
        let member = fx.add(resident(fx.community.id)).await;

        let posted = svc
            .create_alert(&moderator, fx.community.id, alert("Tide warning"))
            .await
            .unwrap();

        let active = svc.active_alerts(fx.community.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, posted.id);
        assert_eq!(center.snapshot(member.id).await.unwrap().unread_count, 0);
    }

    #[tokio::test]
    async fn test_members_cannot_post_alerts() {
        let fx = Fixture::new().await;
        let svc = CommunityService::new(
            fx.db.communities.clone(),
            fx.db.alerts.clone(),
            fx.db.profiles.clone(),
            fx.notifications(),
        );
        let member = ctx(&fx.add(resident(fx.community.id)).await);
        let err = svc
            .create_alert(&member, fx.community.id, alert("Fake"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_lookup_and_access() {
        let fx = Fixture::new().await;
        let svc = CommunityService::new(
            fx.db.communities.clone(),
            fx.db.alerts.clone(),
            fx.db.profiles.clone(),
            fx.notifications(),
        );
        assert_eq!(svc.get_by_slug("seal-cove").await.unwrap().id, fx.community.id);
        assert_eq!(
            svc.get(CommunityId::new()).await.unwrap_err().kind,
            ErrorKind::NotFound
        );

        let moderator = ctx(&fx.add(admin(fx.community.id)).await);
        let report = svc.access(&moderator, fx.community.id).await.unwrap();
        assert!(report.is_admin);
        assert!(report.actions[&Action::CreateAlert]);
    }
}
