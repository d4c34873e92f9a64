//! Fixtures shared by the service tests.

use std::sync::Arc;

use chrono::Utc;

use coastline_core::config::notifications::NotificationsConfig;
use coastline_core::types::{CommunityId, UserId};
use coastline_database::Database;
use coastline_database::memory::MemoryStore;
use coastline_entity::approval::ApprovalStatus;
use coastline_entity::community::Community;
use coastline_entity::profile::{Profile, ProfileRole};

use crate::context::RequestContext;
use crate::notification::NotificationCenter;

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub db: Database,
    pub community: Community,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let db = Database::from_memory(store.clone());
        let community = db
            .communities
            .insert(&community("Seal Cove", "seal-cove"))
            .await
            .unwrap();
        Self {
            store,
            db,
            community,
        }
    }

    pub async fn add(&self, profile: Profile) -> Profile {
        self.db.profiles.insert(&profile).await.unwrap()
    }

    pub async fn add_community(&self, name: &str, slug: &str) -> Community {
        self.db.communities.insert(&community(name, slug)).await.unwrap()
    }

    pub fn notifications(&self) -> Arc<NotificationCenter> {
        Arc::new(NotificationCenter::new(
            self.db.notifications.clone(),
            self.db.profiles.clone(),
            &NotificationsConfig::default(),
        ))
    }
}

pub(crate) fn ctx(profile: &Profile) -> RequestContext {
    RequestContext::new(profile.clone())
}

pub(crate) fn community(name: &str, slug: &str) -> Community {
    Community {
        id: CommunityId::new(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        created_at: Utc::now(),
    }
}

fn profile(role: ProfileRole, community: Option<CommunityId>, status: ApprovalStatus) -> Profile {
    let id = UserId::new();
    Profile {
        id,
        username: format!("user_{}", &id.to_string()[24..]),
        full_name: None,
        email: None,
        role,
        community_id: community,
        approval_status: status,
        is_location_verified: false,
        avatar_url: None,
        business_name: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn resident(community: CommunityId) -> Profile {
    profile(ProfileRole::Resident, Some(community), ApprovalStatus::Approved)
}

pub(crate) fn pending_resident(community: CommunityId) -> Profile {
    profile(ProfileRole::Resident, Some(community), ApprovalStatus::Pending)
}

pub(crate) fn admin(community: CommunityId) -> Profile {
    profile(ProfileRole::CommunityAdmin, Some(community), ApprovalStatus::Approved)
}

pub(crate) fn superadmin() -> Profile {
    profile(ProfileRole::SuperAdmin, None, ApprovalStatus::Approved)
}
