//! Listings, favorites, and inquiries in memory.

use async_trait::async_trait;
use chrono::Utc;

use coastline_core::types::{
    CommunityId, MarketItemId, PageRequest, PageResponse, PropertyId, UserId,
};
use coastline_core::{AppError, AppResult};
use coastline_entity::favorite::FavoriteTarget;
use coastline_entity::inquiry::PropertyInquiry;
use coastline_entity::market::MarketItem;
use coastline_entity::property::{ListingType, Property};

use super::{FavoriteRow, MemoryStore, newest_first};
use crate::repository::{
    FavoriteRepository, InquiryRepository, MarketItemRepository, PropertyRepository,
};

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn insert(&self, property: &Property) -> AppResult<Property> {
        let mut tables = self.write().await;
        if tables.properties.contains_key(&property.id) {
            return Err(AppError::conflict(format!("Property {} already exists", property.id)));
        }
        tables.properties.insert(property.id, property.clone());
        Ok(property.clone())
    }

    async fn find(&self, id: PropertyId) -> AppResult<Option<Property>> {
        let tables = self.read().await;
        Ok(tables
            .properties
            .get(&id)
            .filter(|p| p.deleted_at.is_none())
            .cloned())
    }

    async fn list_approved(
        &self,
        community: CommunityId,
        listing_type: Option<ListingType>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Property>> {
        let tables = self.read().await;
        let mut rows: Vec<Property> = tables
            .properties
            .values()
            .filter(|p| p.community_id == community && p.is_public())
            .filter(|p| listing_type.is_none_or(|t| p.listing_type == t))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| p.created_at);
        let total = rows.len() as u64;
        Ok(PageResponse::new(page.slice(rows), page, total))
    }

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<Property>> {
        let tables = self.read().await;
        let mut rows: Vec<Property> = tables
            .properties
            .values()
            .filter(|p| p.user_id == owner && p.deleted_at.is_none())
            .cloned()
            .collect();
        newest_first(&mut rows, |p| p.created_at);
        Ok(rows)
    }

    async fn update(&self, property: &Property) -> AppResult<Option<Property>> {
        let mut tables = self.write().await;
        match tables.properties.get_mut(&property.id) {
            Some(row) if row.deleted_at.is_none() => {
                *row = Property {
                    updated_at: Utc::now(),
                    created_at: row.created_at,
                    deleted_at: None,
                    ..property.clone()
                };
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: PropertyId) -> AppResult<bool> {
        let mut tables = self.write().await;
        match tables.properties.get_mut(&id) {
            Some(row) if row.deleted_at.is_none() => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl MarketItemRepository for MemoryStore {
    async fn insert(&self, item: &MarketItem) -> AppResult<MarketItem> {
        let mut tables = self.write().await;
        if tables.market_items.contains_key(&item.id) {
            return Err(AppError::conflict(format!("Market item {} already exists", item.id)));
        }
        tables.market_items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn find(&self, id: MarketItemId) -> AppResult<Option<MarketItem>> {
        let tables = self.read().await;
        Ok(tables
            .market_items
            .get(&id)
            .filter(|m| m.deleted_at.is_none())
            .cloned())
    }

    async fn list_approved(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<MarketItem>> {
        let tables = self.read().await;
        let mut rows: Vec<MarketItem> = tables
            .market_items
            .values()
            .filter(|m| m.community_id == community && m.is_public())
            .cloned()
            .collect();
        newest_first(&mut rows, |m| m.created_at);
        let total = rows.len() as u64;
        Ok(PageResponse::new(page.slice(rows), page, total))
    }

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<MarketItem>> {
        let tables = self.read().await;
        let mut rows: Vec<MarketItem> = tables
            .market_items
            .values()
            .filter(|m| m.user_id == owner && m.deleted_at.is_none())
            .cloned()
            .collect();
        newest_first(&mut rows, |m| m.created_at);
        Ok(rows)
    }

    async fn update(&self, item: &MarketItem) -> AppResult<Option<MarketItem>> {
        let mut tables = self.write().await;
        match tables.market_items.get_mut(&item.id) {
            Some(row) if row.deleted_at.is_none() => {
                *row = MarketItem {
                    updated_at: Utc::now(),
                    created_at: row.created_at,
                    deleted_at: None,
                    ..item.clone()
                };
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: MarketItemId) -> AppResult<bool> {
        let mut tables = self.write().await;
        match tables.market_items.get_mut(&id) {
            Some(row) if row.deleted_at.is_none() => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn add(
        &self,
        user: UserId,
        target: FavoriteTarget,
        community: CommunityId,
    ) -> AppResult<bool> {
        let mut tables = self.write().await;
        if tables
            .favorites
            .iter()
            .any(|f| f.user_id == user && f.target == target)
        {
            return Ok(false);
        }
        tables.favorites.push(FavoriteRow {
            user_id: user,
            target,
            community_id: community,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool> {
        let mut tables = self.write().await;
        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|f| !(f.user_id == user && f.target == target));
        Ok(tables.favorites.len() < before)
    }

    async fn is_favorite(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool> {
        let tables = self.read().await;
        Ok(tables
            .favorites
            .iter()
            .any(|f| f.user_id == user && f.target == target))
    }

    async fn list(&self, user: UserId) -> AppResult<Vec<FavoriteTarget>> {
        let tables = self.read().await;
        let mut rows: Vec<&FavoriteRow> =
            tables.favorites.iter().filter(|f| f.user_id == user).collect();
        rows.sort_by_key(|f| std::cmp::Reverse(f.created_at));
        Ok(rows.into_iter().map(|f| f.target).collect())
    }
}

#[async_trait]
impl InquiryRepository for MemoryStore {
    async fn insert(&self, inquiry: &PropertyInquiry) -> AppResult<PropertyInquiry> {
        let mut tables = self.write().await;
        tables.inquiries.push(inquiry.clone());
        Ok(inquiry.clone())
    }

    async fn list_for_seller(
        &self,
        seller: UserId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PropertyInquiry>> {
        let tables = self.read().await;
        let mut rows: Vec<PropertyInquiry> = tables
            .inquiries
            .iter()
            .filter(|i| i.seller_id == seller)
            .cloned()
            .collect();
        newest_first(&mut rows, |i| i.created_at);
        let total = rows.len() as u64;
        Ok(PageResponse::new(page.slice(rows), page, total))
    }
}
