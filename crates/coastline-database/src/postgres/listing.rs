//! Property and marketplace listing repositories.
//!
//! Both tables are soft-deleted: every read filters `deleted_at IS NULL`.

use async_trait::async_trait;
use sqlx::PgPool;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, MarketItemId, PageRequest, PageResponse, PropertyId, UserId};
use coastline_entity::market::MarketItem;
use coastline_entity::property::{ListingType, Property};

use crate::query_error;
use crate::repository::{MarketItemRepository, PropertyRepository};

#[derive(Debug, Clone)]
pub struct PgPropertyRepository {
    pool: PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn insert(&self, property: &Property) -> AppResult<Property> {
        sqlx::query_as::<_, Property>(
            "INSERT INTO properties (id, user_id, community_id, title, description, price, listing_type, \
             location, bedrooms, bathrooms, approval_status, image_files, video_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(property.id)
        .bind(property.user_id)
        .bind(property.community_id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(property.listing_type)
        .bind(&property.location)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.approval_status)
        .bind(&property.image_files)
        .bind(&property.video_url)
        .bind(property.created_at)
        .bind(property.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert property"))
    }

    async fn find(&self, id: PropertyId) -> AppResult<Option<Property>> {
        sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to find property"))
    }

    async fn list_approved(
        &self,
        community: CommunityId,
        listing_type: Option<ListingType>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Property>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM properties WHERE community_id = $1 AND approval_status = 'approved' \
             AND deleted_at IS NULL AND ($2::text IS NULL OR listing_type = $2)",
        )
        .bind(community)
        .bind(listing_type.map(|t| t.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count properties"))?;

        let rows = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE community_id = $1 AND approval_status = 'approved' \
             AND deleted_at IS NULL AND ($2::text IS NULL OR listing_type = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(community)
        .bind(listing_type.map(|t| t.as_str()))
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list properties"))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<Property>> {
        sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list own properties"))
    }

    async fn update(&self, property: &Property) -> AppResult<Option<Property>> {
        sqlx::query_as::<_, Property>(
            "UPDATE properties SET title = $2, description = $3, price = $4, listing_type = $5, \
             location = $6, bedrooms = $7, bathrooms = $8, image_files = $9, video_url = $10, \
             approval_status = $11, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(property.id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(property.listing_type)
        .bind(&property.location)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(&property.image_files)
        .bind(&property.video_url)
        .bind(property.approval_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to update property"))
    }

    async fn soft_delete(&self, id: PropertyId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE properties SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to delete property"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgMarketItemRepository {
    pool: PgPool,
}

impl PgMarketItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketItemRepository for PgMarketItemRepository {
    async fn insert(&self, item: &MarketItem) -> AppResult<MarketItem> {
        sqlx::query_as::<_, MarketItem>(
            "INSERT INTO market_items (id, user_id, community_id, title, description, price, category, \
             condition, approval_status, image_files, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(item.community_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.condition)
        .bind(item.approval_status)
        .bind(&item.image_files)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert market item"))
    }

    async fn find(&self, id: MarketItemId) -> AppResult<Option<MarketItem>> {
        sqlx::query_as::<_, MarketItem>(
            "SELECT * FROM market_items WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to find market item"))
    }

    async fn list_approved(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<MarketItem>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM market_items WHERE community_id = $1 \
             AND approval_status = 'approved' AND deleted_at IS NULL",
        )
        .bind(community)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count market items"))?;

        let rows = sqlx::query_as::<_, MarketItem>(
            "SELECT * FROM market_items WHERE community_id = $1 AND approval_status = 'approved' \
             AND deleted_at IS NULL ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(community)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list market items"))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<MarketItem>> {
        sqlx::query_as::<_, MarketItem>(
            "SELECT * FROM market_items WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list own market items"))
    }

    async fn update(&self, item: &MarketItem) -> AppResult<Option<MarketItem>> {
        sqlx::query_as::<_, MarketItem>(
            "UPDATE market_items SET title = $2, description = $3, price = $4, category = $5, \
             condition = $6, image_files = $7, approval_status = $8, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.condition)
        .bind(&item.image_files)
        .bind(item.approval_status)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to update market item"))
    }

    async fn soft_delete(&self, id: MarketItemId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE market_items SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to delete market item"))?;
        Ok(result.rows_affected() > 0)
    }
}
