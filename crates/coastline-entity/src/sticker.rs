//! Stickers and sticker packs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, StickerId, StickerPackId, UserId};

/// A row of the `stickers` table. `src` is the path in the `reactions` bucket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sticker {
    pub id: StickerId,
    pub community_id: CommunityId,
    pub label: String,
    pub category: String,
    pub section: String,
    pub src: String,
    pub public_url: String,
    pub uploaded_by: UserId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// A named, ordered collection of stickers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StickerPack {
    pub id: StickerPackId,
    pub community_id: CommunityId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Membership of a sticker in a pack.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StickerPackItem {
    pub pack_id: StickerPackId,
    pub sticker_id: StickerId,
    pub position: i32,
}

/// A pack with its stickers in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerPackWithItems {
    #[serde(flatten)]
    pub pack: StickerPack,
    pub stickers: Vec<Sticker>,
}
