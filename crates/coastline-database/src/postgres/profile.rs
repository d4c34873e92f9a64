//! Profile repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, UserId};
use coastline_entity::profile::{Profile, ProfileUpdate};

use crate::query_error;
use crate::repository::ProfileRepository;

#[derive(Debug, Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find profile"))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<Profile>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to load profiles"))
    }

    async fn insert(&self, profile: &Profile) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, username, full_name, email, role, community_id, approval_status, \
             is_location_verified, avatar_url, business_name, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(profile.role)
        .bind(profile.community_id)
        .bind(profile.approval_status)
        .bind(profile.is_location_verified)
        .bind(&profile.avatar_url)
        .bind(&profile.business_name)
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert profile"))
    }

    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET \
             username = COALESCE($2, username), \
             full_name = COALESCE($3, full_name), \
             avatar_url = COALESCE($4, avatar_url), \
             business_name = COALESCE($5, business_name) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.full_name)
        .bind(&update.avatar_url)
        .bind(&update.business_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to update profile"))
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to delete profile"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn community_admins(&self, community: CommunityId) -> AppResult<Vec<Profile>> {
        sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE community_id = $1 AND role = 'community admin' \
             ORDER BY created_at",
        )
        .bind(community)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list community admins"))
    }

    async fn approved_members(&self, community: CommunityId) -> AppResult<Vec<Profile>> {
        sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE community_id = $1 \
             AND (approval_status = 'approved' OR role IN ('community admin', 'superadmin')) \
             ORDER BY created_at",
        )
        .bind(community)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list community members"))
    }
}
