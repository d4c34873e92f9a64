//! Profiles, communities, alerts and verification requests in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coastline_core::types::{CommunityId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_entity::community::{Community, CommunityAlert};
use coastline_entity::profile::{Profile, ProfileRole, ProfileUpdate};
use coastline_entity::verification::{VerificationRequest, VerificationStatus};

use super::{MemoryStore, newest_first};
use crate::repository::{
    AlertRepository, CommunityRepository, ProfileRepository, VerificationRepository,
};

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<Profile>> {
        Ok(self.read().await.profiles.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<Profile>> {
        let tables = self.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }

    async fn insert(&self, profile: &Profile) -> AppResult<Profile> {
        let mut tables = self.write().await;
        if tables.profiles.contains_key(&profile.id) {
            return Err(AppError::conflict(format!("Profile {} already exists", profile.id)));
        }
        if tables
            .profiles
            .values()
            .any(|p| p.username.eq_ignore_ascii_case(&profile.username))
        {
            return Err(AppError::conflict(format!(
                "Username '{}' is taken",
                profile.username
            )));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AppResult<Option<Profile>> {
        let mut tables = self.write().await;
        if let Some(username) = &update.username {
            if tables
                .profiles
                .values()
                .any(|p| p.id != id && p.username.eq_ignore_ascii_case(username))
            {
                return Err(AppError::conflict(format!("Username '{username}' is taken")));
            }
        }
        let Some(profile) = tables.profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &update.username {
            profile.username = username.clone();
        }
        if let Some(full_name) = &update.full_name {
            profile.full_name = Some(full_name.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(business_name) = &update.business_name {
            profile.business_name = Some(business_name.clone());
        }
        Ok(Some(profile.clone()))
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut tables = self.write().await;
        let removed = tables.profiles.remove(&id).is_some();
        if removed {
            tables.favorites.retain(|f| f.user_id != id);
            tables
                .friendships
                .retain(|f| f.user_id != id && f.friend_id != id);
            tables
                .friend_requests
                .retain(|_, r| r.sender_id != id && r.recipient_id != id);
            tables.notifications.retain(|n| n.recipient_id != id);
        }
        Ok(removed)
    }

    async fn community_admins(&self, community: CommunityId) -> AppResult<Vec<Profile>> {
        let tables = self.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| p.role == ProfileRole::CommunityAdmin && p.belongs_to(community))
            .cloned()
            .collect())
    }

    async fn approved_members(&self, community: CommunityId) -> AppResult<Vec<Profile>> {
        let tables = self.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| p.belongs_to(community) && p.is_approved())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommunityRepository for MemoryStore {
    async fn find_by_id(&self, id: CommunityId) -> AppResult<Option<Community>> {
        Ok(self.read().await.communities.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Community>> {
        let tables = self.read().await;
        Ok(tables
            .communities
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Community>> {
        let tables = self.read().await;
        let mut all: Vec<Community> = tables.communities.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert(&self, community: &Community) -> AppResult<Community> {
        let mut tables = self.write().await;
        if tables.communities.values().any(|c| c.slug == community.slug) {
            return Err(AppError::conflict(format!(
                "Community slug '{}' is taken",
                community.slug
            )));
        }
        tables.communities.insert(community.id, community.clone());
        Ok(community.clone())
    }
}

#[async_trait]
impl AlertRepository for MemoryStore {
    async fn insert(&self, alert: &CommunityAlert) -> AppResult<CommunityAlert> {
        self.write().await.alerts.push(alert.clone());
        Ok(alert.clone())
    }

    async fn active(
        &self,
        community: CommunityId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<CommunityAlert>> {
        let tables = self.read().await;
        let mut rows: Vec<CommunityAlert> = tables
            .alerts
            .iter()
            .filter(|a| a.community_id == community && a.is_active_at(now))
            .cloned()
            .collect();
        newest_first(&mut rows, |a| a.created_at);
        Ok(rows)
    }
}

#[async_trait]
impl VerificationRepository for MemoryStore {
    async fn insert(&self, request: &VerificationRequest) -> AppResult<VerificationRequest> {
        let mut tables = self.write().await;
        tables.verifications.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn latest_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>> {
        let tables = self.read().await;
        Ok(tables
            .verifications
            .values()
            .filter(|v| v.user_id == user)
            .max_by_key(|v| (v.created_at, v.id))
            .cloned())
    }

    async fn pending_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>> {
        let tables = self.read().await;
        Ok(tables
            .verifications
            .values()
            .filter(|v| v.user_id == user && v.status == VerificationStatus::Pending)
            .max_by_key(|v| (v.created_at, v.id))
            .cloned())
    }
}
