//! Admin approval queue for profiles, listings and verification requests.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use coastline_auth::Action;
use coastline_core::types::{CommunityId, PageRequest, PageResponse};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::ApprovalRepository;
use coastline_entity::approval::{
    ApprovalCounts, ApprovalItem, ApprovalKind, ApprovalStatus, DecideResult, Decision,
};
use coastline_entity::notification::NewNotification;

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

/// Result of a decision that was written.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub kind: ApprovalKind,
    pub id: Uuid,
    pub status: ApprovalStatus,
    /// Status label as stored for this kind (`rejected` for verification).
    pub stored_status: &'static str,
    pub item: ApprovalItem,
    /// Whether the submitter's notification was stored.
    pub notified: bool,
}

/// One workflow for every approval-gated kind.
#[derive(Clone)]
pub struct ApprovalService {
    approvals: Arc<dyn ApprovalRepository>,
    notifications: Arc<NotificationCenter>,
}

impl ApprovalService {
    pub fn new(
        approvals: Arc<dyn ApprovalRepository>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self { approvals, notifications }
    }

    /// Pending rows of `kind`, oldest first.
    pub async fn queue(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        kind: ApprovalKind,
        page: PageRequest,
    ) -> AppResult<PageResponse<ApprovalItem>> {
        ctx.require(Action::ReviewApprovals, community)?;
        self.approvals.list_pending(community, kind, page).await
    }

    /// Status counts per kind, one entry for every kind.
    pub async fn dashboard(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
    ) -> AppResult<Vec<ApprovalCounts>> {
        ctx.require(Action::ReviewApprovals, community)?;
        let counts = self.approvals.counts(community).await?;
        Ok(ApprovalKind::ALL
            .iter()
            .map(|&kind| {
                counts
                    .iter()
                    .find(|c| c.kind == kind)
                    .copied()
                    .unwrap_or_else(|| ApprovalCounts::empty(kind))
            })
            .collect())
    }

    /// Approve or decline one pending row.
    ///
    /// The write only happens while the row is still pending in
    /// `community`. The submitter is notified afterwards; an approved
    /// verification also marks the profile as location verified.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        kind: ApprovalKind,
        id: Uuid,
        decision: Decision,
    ) -> AppResult<ApprovalOutcome> {
        ctx.require(Action::ReviewApprovals, community)?;

        let item = match self.approvals.decide(community, kind, id, decision).await? {
            DecideResult::Updated(item) => item,
            DecideResult::NotFound => {
                return Err(AppError::not_found(format!(
                    "No {kind} with id {id} in this community"
                )));
            }
            DecideResult::AlreadyDecided(status) => {
                return Err(AppError::conflict(format!("This {kind} is already {status}")));
            }
        };

        info!(
            admin_id = %ctx.user_id(),
            community_id = %community,
            %kind,
            %id,
            status = %item.status,
            "Approval decided"
        );

        let notified = self
            .notifications
            .deliver(
                NewNotification::new(item.submitter_id, kind.outcome_notification(decision))
                    .actor(ctx.user_id())
                    .target(kind.target_type(), item.id)
                    .community(community)
                    .snippet(&item.title),
            )
            .await;

        Ok(ApprovalOutcome {
            kind,
            id,
            status: item.status,
            stored_status: kind.decided_label(decision),
            item,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, admin, ctx, pending_resident, resident};
    use coastline_core::error::ErrorKind;
    use coastline_entity::notification::NotificationKind;
    use coastline_entity::property::{ListingType, PropertyDraft};
    use coastline_entity::verification::AddressSubmission;

    fn service(fx: &Fixture) -> ApprovalService {
        ApprovalService::new(fx.db.approvals.clone(), fx.notifications())
    }

    fn draft(title: &str) -> PropertyDraft {
        PropertyDraft {
            title: title.to_string(),
            description: None,
            price: 1200.0,
            listing_type: ListingType::Rent,
            location: None,
            bedrooms: None,
            bathrooms: None,
            image_files: vec![],
            video_url: None,
        }
    }

    fn property_counts(counts: &[ApprovalCounts]) -> ApprovalCounts {
        *counts.iter().find(|c| c.kind == ApprovalKind::Property).unwrap()
    }

    #[tokio::test]
    async fn test_badges_follow_decisions() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let admin = ctx(&fx.add(admin(fx.community.id)).await);
        let owner = fx.add(resident(fx.community.id)).await;
        let first = fx
            .db
            .properties
            .insert(&draft("Harbour loft").into_property(owner.id, fx.community.id))
            .await
            .unwrap();
        fx.db
            .properties
            .insert(&draft("Dune cottage").into_property(owner.id, fx.community.id))
            .await
            .unwrap();

        let before = property_counts(&svc.dashboard(&admin, fx.community.id).await.unwrap());
        assert_eq!(before.pending, 2);

        let outcome = svc
            .decide(
                &admin,
                fx.community.id,
                ApprovalKind::Property,
                first.id.0,
                Decision::Approve,
            )
            .await
            .unwrap();
        assert_eq!(outcome.status, ApprovalStatus::Approved);
        assert!(outcome.notified);

        let after = property_counts(&svc.dashboard(&admin, fx.community.id).await.unwrap());
        assert_eq!(after.pending, 1);
        assert_eq!(after.approved, before.approved + 1);

        let queue = svc
            .queue(&admin, fx.community.id, ApprovalKind::Property, PageRequest::default())
            .await
            .unwrap();
        assert!(queue.items.iter().all(|i| i.id != first.id.0));
    }

    #[tokio::test]
    async fn test_deciding_twice_conflicts() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let admin = ctx(&fx.add(admin(fx.community.id)).await);
        let applicant = fx.add(pending_resident(fx.community.id)).await;

        svc.decide(&admin, fx.community.id, ApprovalKind::User, applicant.id.0, Decision::Decline)
            .await
            .unwrap();
        let err = svc
            .decide(&admin, fx.community.id, ApprovalKind::User, applicant.id.0, Decision::Approve)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let stored = fx.db.profiles.find_by_id(applicant.id).await.unwrap().unwrap();
        assert_eq!(stored.approval_status, ApprovalStatus::Declined);
    }

    #[tokio::test]
    async fn test_other_community_admin_is_denied_without_writes() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let elsewhere = fx.add_community("Gull Point", "gull-point").await;
        let outsider = ctx(&fx.add(admin(elsewhere.id)).await);
        let applicant = fx.add(pending_resident(fx.community.id)).await;

        let writes = fx.store.mutation_count();
        let err = svc
            .decide(&outsider, fx.community.id, ApprovalKind::User, applicant.id.0, Decision::Approve)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(fx.store.mutation_count(), writes);
    }

    #[tokio::test]
    async fn test_unknown_row_is_not_found() {
        let fx = Fixture::new().await;
        let svc = service(&fx);
        let admin = ctx(&fx.add(admin(fx.community.id)).await);
        let err = svc
            .decide(&admin, fx.community.id, ApprovalKind::MarketItem, Uuid::new_v4(), Decision::Approve)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_verification_approval_marks_profile() {
        let fx = Fixture::new().await;
        let center = fx.notifications();
        let svc = ApprovalService::new(fx.db.approvals.clone(), center.clone());
        let admin = ctx(&fx.add(admin(fx.community.id)).await);
        let user = fx.add(resident(fx.community.id)).await;
        let request = fx
            .db
            .verifications
            .insert(
                &AddressSubmission {
                    street_address: "4 Lighthouse Rd".into(),
                    city: "Seal Cove".into(),
                    postal_code: "sc1 2ab".into(),
                }
                .into_request(user.id, fx.community.id),
            )
            .await
            .unwrap();

        let outcome = svc
            .decide(&admin, fx.community.id, ApprovalKind::Verification, request.id.0, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(outcome.stored_status, "approved");

        let profile = fx.db.profiles.find_by_id(user.id).await.unwrap().unwrap();
        assert!(profile.is_location_verified);
        let snapshot = center.snapshot(user.id).await.unwrap();
        assert_eq!(
            snapshot.notifications[0].notification.kind,
            NotificationKind::VerificationApproved
        );
    }
}
