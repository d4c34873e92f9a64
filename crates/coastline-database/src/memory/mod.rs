//! In-process implementation of every repository.
//!
//! Tables are plain collections behind one `RwLock`, so each repository
//! call is atomic with respect to the others. Used by the `memory`
//! provider for local development and by the test suites.

mod approval;
mod listing;
mod profile;
mod social;
mod sticker;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use coastline_core::types::{
    CommunityId, FriendRequestId, MarketItemId, PostId, PropertyId, StickerId, StickerPackId,
    UserId, VerificationRequestId,
};
use coastline_entity::community::{Community, CommunityAlert};
use coastline_entity::favorite::FavoriteTarget;
use coastline_entity::friend::{FriendRequest, Friendship};
use coastline_entity::inquiry::PropertyInquiry;
use coastline_entity::market::MarketItem;
use coastline_entity::notification::Notification;
use coastline_entity::post::{Post, PostReport};
use coastline_entity::profile::Profile;
use coastline_entity::property::Property;
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem};
use coastline_entity::verification::VerificationRequest;

#[derive(Debug, Clone)]
pub(crate) struct FavoriteRow {
    pub user_id: UserId,
    pub target: FavoriteTarget,
    pub community_id: CommunityId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub profiles: HashMap<UserId, Profile>,
    pub communities: HashMap<CommunityId, Community>,
    pub alerts: Vec<CommunityAlert>,
    pub properties: HashMap<PropertyId, Property>,
    pub market_items: HashMap<MarketItemId, MarketItem>,
    pub posts: HashMap<PostId, Post>,
    pub reports: Vec<PostReport>,
    pub notifications: Vec<Notification>,
    pub friend_requests: HashMap<FriendRequestId, FriendRequest>,
    pub friendships: Vec<Friendship>,
    pub verifications: HashMap<VerificationRequestId, VerificationRequest>,
    pub favorites: Vec<FavoriteRow>,
    pub stickers: HashMap<StickerId, Sticker>,
    pub packs: HashMap<StickerPackId, StickerPack>,
    pub pack_items: Vec<StickerPackItem>,
    pub inquiries: Vec<PropertyInquiry>,
}

/// Shared in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    mutations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write operations issued so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.tables.write().await
    }
}

/// Sort newest first by a timestamp key.
pub(crate) fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}
