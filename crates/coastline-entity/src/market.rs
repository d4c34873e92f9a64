//! Marketplace item entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, MarketItemId, UserId};

use crate::approval::ApprovalStatus;

/// A row of the `market_items` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketItem {
    pub id: MarketItemId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub approval_status: ApprovalStatus,
    pub image_files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MarketItem {
    pub fn is_public(&self) -> bool {
        self.deleted_at.is_none() && self.approval_status == ApprovalStatus::Approved
    }
}

/// Seller-supplied fields for a marketplace item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketItemDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub condition: Option<String>,
    #[serde(default)]
    pub image_files: Vec<String>,
}

impl MarketItemDraft {
    pub fn into_item(self, user_id: UserId, community_id: CommunityId) -> MarketItem {
        let now = Utc::now();
        MarketItem {
            id: MarketItemId::new(),
            user_id,
            community_id,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            condition: self.condition,
            approval_status: ApprovalStatus::Pending,
            image_files: self.image_files,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply_to(self, item: &mut MarketItem) {
        item.title = self.title;
        item.description = self.description;
        item.price = self.price;
        item.category = self.category;
        item.condition = self.condition;
        item.image_files = self.image_files;
        item.updated_at = Utc::now();
    }
}
