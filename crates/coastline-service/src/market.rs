//! Marketplace items and wishlists.

use std::sync::Arc;

use tracing::info;

use coastline_auth::Action;
use coastline_core::types::{CommunityId, MarketItemId, PageRequest, PageResponse};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{FavoriteRepository, MarketItemRepository};
use coastline_entity::approval::ApprovalStatus;
use coastline_entity::favorite::{FavoriteState, FavoriteTarget};
use coastline_entity::market::{MarketItem, MarketItemDraft};

use crate::context::RequestContext;
use crate::property::{can_see_unpublished, validate_listing};

#[derive(Clone)]
pub struct MarketService {
    items: Arc<dyn MarketItemRepository>,
    favorites: Arc<dyn FavoriteRepository>,
}

impl MarketService {
    pub fn new(items: Arc<dyn MarketItemRepository>, favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { items, favorites }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        community: Option<CommunityId>,
        draft: MarketItemDraft,
    ) -> AppResult<MarketItem> {
        let community = ctx.target_community(community)?;
        ctx.require(Action::Contribute, community)?;
        validate_listing(&draft.title, draft.price)?;

        let item = self
            .items
            .insert(&draft.into_item(ctx.user_id(), community))
            .await?;
        info!(item_id = %item.id, user_id = %ctx.user_id(), "Market item submitted");
        Ok(item)
    }

    /// Same visibility rules as property listings.
    pub async fn get(&self, viewer: Option<&RequestContext>, id: MarketItemId) -> AppResult<MarketItem> {
        let item = self.find(id).await?;
        if item.is_public() || can_see_unpublished(viewer, item.user_id, item.community_id) {
            Ok(item)
        } else {
            Err(not_found(id))
        }
    }

    pub async fn list(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<MarketItem>> {
        self.items.list_approved(community, page).await
    }

    pub async fn list_mine(&self, ctx: &RequestContext) -> AppResult<Vec<MarketItem>> {
        self.items.list_by_owner(ctx.user_id()).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: MarketItemId,
        draft: MarketItemDraft,
    ) -> AppResult<MarketItem> {
        let mut item = self.find(id).await?;
        if item.user_id != ctx.user_id() {
            return Err(AppError::authorization("Only the seller can edit this item"));
        }
        validate_listing(&draft.title, draft.price)?;

        draft.apply_to(&mut item);
        item.approval_status = ApprovalStatus::Pending;
        self.items.update(&item).await?.ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, ctx: &RequestContext, id: MarketItemId) -> AppResult<()> {
        let item = self.find(id).await?;
        if item.user_id != ctx.user_id() {
            ctx.require(Action::RemoveContent, item.community_id)?;
        }
        if !self.items.soft_delete(id).await? {
            return Err(not_found(id));
        }
        info!(item_id = %id, user_id = %ctx.user_id(), "Market item withdrawn");
        Ok(())
    }

    /// Add to or remove from the caller's wishlist.
    pub async fn toggle_wishlist(&self, ctx: &RequestContext, id: MarketItemId) -> AppResult<FavoriteState> {
        let item = self.get(Some(ctx), id).await?;
        let target = FavoriteTarget::MarketItem(id);
        let favorited = if self.favorites.remove(ctx.user_id(), target).await? {
            false
        } else {
            self.favorites.add(ctx.user_id(), target, item.community_id).await?;
            true
        };
        Ok(FavoriteState { target, favorited })
    }

    async fn find(&self, id: MarketItemId) -> AppResult<MarketItem> {
        self.items.find(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: MarketItemId) -> AppError {
    AppError::not_found(format!("Market item {id} not found"))
}
