//! Favorites (`property_favorites`) and wishlist (`wishlist`) repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, MarketItemId, PropertyId, UserId};
use coastline_entity::favorite::FavoriteTarget;

use crate::query_error;
use crate::repository::FavoriteRepository;

fn table(target: &FavoriteTarget) -> (&'static str, &'static str) {
    match target {
        FavoriteTarget::Property(_) => ("property_favorites", "property_id"),
        FavoriteTarget::MarketItem(_) => ("wishlist", "market_item_id"),
    }
}

#[derive(Debug, Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn add(
        &self,
        user: UserId,
        target: FavoriteTarget,
        community: CommunityId,
    ) -> AppResult<bool> {
        let (table, column) = table(&target);
        let result = sqlx::query(&format!(
            "INSERT INTO {table} (user_id, {column}, community_id, created_at) VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (user_id, {column}) DO NOTHING"
        ))
        .bind(user)
        .bind(target.id())
        .bind(community)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to add favorite"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool> {
        let (table, column) = table(&target);
        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE user_id = $1 AND {column} = $2"
        ))
        .bind(user)
        .bind(target.id())
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to remove favorite"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_favorite(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool> {
        let (table, column) = table(&target);
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE user_id = $1 AND {column} = $2)"
        ))
        .bind(user)
        .bind(target.id())
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to check favorite"))
    }

    async fn list(&self, user: UserId) -> AppResult<Vec<FavoriteTarget>> {
        let properties: Vec<Uuid> = sqlx::query_scalar(
            "SELECT property_id FROM property_favorites WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list favorites"))?;

        let items: Vec<Uuid> = sqlx::query_scalar(
            "SELECT market_item_id FROM wishlist WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list wishlist"))?;

        Ok(properties
            .into_iter()
            .map(|id| FavoriteTarget::Property(PropertyId::from_uuid(id)))
            .chain(
                items
                    .into_iter()
                    .map(|id| FavoriteTarget::MarketItem(MarketItemId::from_uuid(id))),
            )
            .collect())
    }
}
