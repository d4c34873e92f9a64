//! Approval queue over the in-memory tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{
    CommunityId, MarketItemId, PageRequest, PageResponse, PropertyId, UserId,
    VerificationRequestId,
};
use coastline_entity::approval::{
    ApprovalCounts, ApprovalItem, ApprovalKind, ApprovalStatus, DecideResult, Decision,
};
use coastline_entity::profile::{Profile, ProfileRole};
use coastline_entity::verification::{VerificationRequest, VerificationStatus};

use super::{MemoryStore, Tables};
use crate::repository::{ApprovalRepository, PendingTotal};

fn profile_kind(profile: &Profile) -> Option<ApprovalKind> {
    match profile.role {
        ProfileRole::Resident => Some(ApprovalKind::User),
        ProfileRole::Business => Some(ApprovalKind::Business),
        _ => None,
    }
}

fn verification_status(status: VerificationStatus) -> ApprovalStatus {
    match status {
        VerificationStatus::Pending => ApprovalStatus::Pending,
        VerificationStatus::Approved => ApprovalStatus::Approved,
        VerificationStatus::Rejected => ApprovalStatus::Declined,
    }
}

fn verification_item(req: &VerificationRequest) -> ApprovalItem {
    ApprovalItem {
        id: req.id.0,
        kind: ApprovalKind::Verification,
        community_id: req.community_id,
        submitter_id: req.user_id,
        title: format!("{}, {}", req.street_address, req.city),
        status: verification_status(req.status),
        created_at: req.created_at,
    }
}

/// Project every row of `kind` onto an approval item.
fn items(tables: &Tables, kind: ApprovalKind) -> Vec<ApprovalItem> {
    match kind {
        ApprovalKind::User | ApprovalKind::Business => tables
            .profiles
            .values()
            .filter(|p| profile_kind(p) == Some(kind))
            .filter_map(|p| {
                Some(ApprovalItem {
                    id: p.id.0,
                    kind,
                    community_id: p.community_id?,
                    submitter_id: p.id,
                    title: p.display_name().to_string(),
                    status: p.approval_status,
                    created_at: p.created_at,
                })
            })
            .collect(),
        ApprovalKind::Property => tables
            .properties
            .values()
            .filter(|p| p.deleted_at.is_none())
            .map(|p| ApprovalItem {
                id: p.id.0,
                kind,
                community_id: p.community_id,
                submitter_id: p.user_id,
                title: p.title.clone(),
                status: p.approval_status,
                created_at: p.created_at,
            })
            .collect(),
        ApprovalKind::MarketItem => tables
            .market_items
            .values()
            .filter(|m| m.deleted_at.is_none())
            .map(|m| ApprovalItem {
                id: m.id.0,
                kind,
                community_id: m.community_id,
                submitter_id: m.user_id,
                title: m.title.clone(),
                status: m.approval_status,
                created_at: m.created_at,
            })
            .collect(),
        ApprovalKind::Verification => tables.verifications.values().map(verification_item).collect(),
    }
}

fn decide_in(
    tables: &mut Tables,
    community: CommunityId,
    kind: ApprovalKind,
    id: Uuid,
    decision: Decision,
) -> AppResult<DecideResult> {
    let current = items(tables, kind)
        .into_iter()
        .find(|item| item.id == id && item.community_id == community);
    let Some(mut item) = current else {
        return Ok(DecideResult::NotFound);
    };
    if !item.status.is_pending() {
        return Ok(DecideResult::AlreadyDecided(item.status));
    }
    let next = item.status.transition(decision)?;

    match kind {
        ApprovalKind::User | ApprovalKind::Business => {
            if let Some(p) = tables.profiles.get_mut(&UserId::from_uuid(id)) {
                p.approval_status = next;
            }
        }
        ApprovalKind::Property => {
            if let Some(p) = tables.properties.get_mut(&PropertyId::from_uuid(id)) {
                p.approval_status = next;
                p.updated_at = Utc::now();
            }
        }
        ApprovalKind::MarketItem => {
            if let Some(m) = tables.market_items.get_mut(&MarketItemId::from_uuid(id)) {
                m.approval_status = next;
                m.updated_at = Utc::now();
            }
        }
        ApprovalKind::Verification => {
            if let Some(v) = tables
                .verifications
                .get_mut(&VerificationRequestId::from_uuid(id))
            {
                v.status = match decision {
                    Decision::Approve => VerificationStatus::Approved,
                    Decision::Decline => VerificationStatus::Rejected,
                };
                v.reviewed_at = Some(Utc::now());
            }
            if decision == Decision::Approve {
                if let Some(p) = tables.profiles.get_mut(&item.submitter_id) {
                    p.is_location_verified = true;
                }
            }
        }
    }

    item.status = next;
    Ok(DecideResult::Updated(item))
}

#[async_trait]
impl ApprovalRepository for MemoryStore {
    async fn list_pending(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        page: PageRequest,
    ) -> AppResult<PageResponse<ApprovalItem>> {
        let tables = self.read().await;
        let mut pending: Vec<ApprovalItem> = items(&tables, kind)
            .into_iter()
            .filter(|item| item.community_id == community && item.status.is_pending())
            .collect();
        pending.sort_by_key(|item| (item.created_at, item.id));
        let total = pending.len() as u64;
        Ok(PageResponse::new(page.slice(pending), page, total))
    }

    async fn counts(&self, community: CommunityId) -> AppResult<Vec<ApprovalCounts>> {
        let tables = self.read().await;
        Ok(ApprovalKind::ALL
            .iter()
            .map(|&kind| {
                let mut counts = ApprovalCounts::empty(kind);
                for item in items(&tables, kind) {
                    if item.community_id == community {
                        counts.record(item.status, 1);
                    }
                }
                counts
            })
            .collect())
    }

    async fn decide(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        id: Uuid,
        decision: Decision,
    ) -> AppResult<DecideResult> {
        let mut tables = self.write().await;
        decide_in(&mut tables, community, kind, id, decision)
    }

    async fn pending_totals(&self) -> AppResult<Vec<PendingTotal>> {
        let tables = self.read().await;
        let mut totals = Vec::new();
        for &kind in ApprovalKind::ALL {
            let mut per_community: HashMap<CommunityId, u64> = HashMap::new();
            for item in items(&tables, kind) {
                if item.status.is_pending() {
                    *per_community.entry(item.community_id).or_default() += 1;
                }
            }
            totals.extend(
                per_community
                    .into_iter()
                    .map(|(community_id, pending)| PendingTotal {
                        community_id,
                        kind,
                        pending,
                    }),
            );
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::PropertyRepository;
    use coastline_entity::property::{ListingType, PropertyDraft};
    use coastline_entity::verification::AddressSubmission;

    fn draft(title: &str) -> PropertyDraft {
        PropertyDraft {
            title: title.to_string(),
            description: None,
            price: 900.0,
            listing_type: ListingType::Rent,
            location: None,
            bedrooms: None,
            bathrooms: None,
            image_files: vec![],
            video_url: None,
        }
    }

    #[tokio::test]
    async fn test_decide_moves_row_out_of_pending() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let a = draft("A").into_property(UserId::new(), community);
        let b = draft("B").into_property(UserId::new(), community);
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        let counts = store.counts(community).await.unwrap();
        let property = counts.iter().find(|c| c.kind == ApprovalKind::Property).unwrap();
        assert_eq!(property.pending, 2);

        let result = store
            .decide(community, ApprovalKind::Property, a.id.0, Decision::Approve)
            .await
            .unwrap();
        assert!(matches!(result, DecideResult::Updated(ref item) if item.status == ApprovalStatus::Approved));

        let pending = store
            .list_pending(community, ApprovalKind::Property, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(pending.items.len(), 1);
        assert_eq!(pending.items[0].id, b.id.0);

        let again = store
            .decide(community, ApprovalKind::Property, a.id.0, Decision::Decline)
            .await
            .unwrap();
        assert!(matches!(again, DecideResult::AlreadyDecided(ApprovalStatus::Approved)));
    }

    #[tokio::test]
    async fn test_decide_is_scoped_to_community() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let listing = draft("Loft").into_property(UserId::new(), community);
        store.insert(&listing).await.unwrap();

        let result = store
            .decide(CommunityId::new(), ApprovalKind::Property, listing.id.0, Decision::Approve)
            .await
            .unwrap();
        assert!(matches!(result, DecideResult::NotFound));
        let row = store.find(listing.id).await.unwrap().unwrap();
        assert_eq!(row.approval_status, ApprovalStatus::Pending);
    }

    async fn seed_verification(store: &MemoryStore, community: CommunityId) -> (UserId, Uuid) {
        let user = Profile {
            id: UserId::new(),
            username: "tern".to_string(),
            full_name: None,
            email: None,
            role: ProfileRole::Resident,
            community_id: Some(community),
            approval_status: ApprovalStatus::Approved,
            is_location_verified: false,
            avatar_url: None,
            business_name: None,
            created_at: Utc::now(),
        };
        let request = AddressSubmission {
            street_address: "4 Dune Road".to_string(),
            city: "Saltmarsh".to_string(),
            postal_code: "sm1 2ab".to_string(),
        }
        .into_request(user.id, community);
        let mut tables = store.write().await;
        tables.profiles.insert(user.id, user.clone());
        tables.verifications.insert(request.id, request.clone());
        (user.id, request.id.0)
    }

    #[tokio::test]
    async fn test_verification_approval_flags_profile_in_same_write() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let (user, request) = seed_verification(&store, community).await;
        let before = store.mutation_count();

        let result = store
            .decide(community, ApprovalKind::Verification, request, Decision::Approve)
            .await
            .unwrap();
        assert!(matches!(result, DecideResult::Updated(ref item) if item.submitter_id == user));
        assert_eq!(store.mutation_count(), before + 1);

        let tables = store.read().await;
        assert!(tables.profiles[&user].is_location_verified);
        let row = &tables.verifications[&VerificationRequestId::from_uuid(request)];
        assert_eq!(row.status, VerificationStatus::Approved);
    }

    #[tokio::test]
    async fn test_verification_decline_leaves_profile_unverified() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let (user, request) = seed_verification(&store, community).await;

        store
            .decide(community, ApprovalKind::Verification, request, Decision::Decline)
            .await
            .unwrap();

        let tables = store.read().await;
        assert!(!tables.profiles[&user].is_location_verified);
        let row = &tables.verifications[&VerificationRequestId::from_uuid(request)];
        assert_eq!(row.status, VerificationStatus::Rejected);
    }
}
