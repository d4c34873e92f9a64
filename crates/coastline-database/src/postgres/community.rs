//! Community and community alert repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::CommunityId;
use coastline_entity::community::{Community, CommunityAlert};

use crate::query_error;
use crate::repository::{AlertRepository, CommunityRepository};

#[derive(Debug, Clone)]
pub struct PgCommunityRepository {
    pool: PgPool,
}

impl PgCommunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunityRepository for PgCommunityRepository {
    async fn find_by_id(&self, id: CommunityId) -> AppResult<Option<Community>> {
        sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find community"))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Community>> {
        sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find community by slug"))
    }

    async fn list(&self) -> AppResult<Vec<Community>> {
        sqlx::query_as::<_, Community>("SELECT * FROM communities ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to list communities"))
    }

    async fn insert(&self, community: &Community) -> AppResult<Community> {
        sqlx::query_as::<_, Community>(
            "INSERT INTO communities (id, name, slug, description, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(community.id)
        .bind(&community.name)
        .bind(&community.slug)
        .bind(&community.description)
        .bind(community.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert community"))
    }
}

#[derive(Debug, Clone)]
pub struct PgAlertRepository {
    pool: PgPool,
}

impl PgAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertRepository for PgAlertRepository {
    async fn insert(&self, alert: &CommunityAlert) -> AppResult<CommunityAlert> {
        sqlx::query_as::<_, CommunityAlert>(
            "INSERT INTO community_alerts (id, community_id, author_id, title, message, severity, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(alert.id)
        .bind(alert.community_id)
        .bind(alert.author_id)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.severity)
        .bind(alert.created_at)
        .bind(alert.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert community alert"))
    }

    async fn active(
        &self,
        community: CommunityId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<CommunityAlert>> {
        sqlx::query_as::<_, CommunityAlert>(
            "SELECT * FROM community_alerts WHERE community_id = $1 \
             AND (expires_at IS NULL OR expires_at > $2) ORDER BY created_at DESC",
        )
        .bind(community)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list community alerts"))
    }
}
