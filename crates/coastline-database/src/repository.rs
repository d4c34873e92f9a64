//! Repository traits: every query the service layer issues.
//!
//! Conditional writes (approval decisions, friend request answers,
//! favorites) are expressed as single operations so that two concurrent
//! callers cannot both observe success.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{
    CommunityId, FriendRequestId, MarketItemId, NotificationId, PageRequest, PageResponse, PostId,
    PropertyId, StickerId, StickerPackId, UserId,
};
use coastline_entity::approval::{ApprovalCounts, ApprovalItem, ApprovalKind, DecideResult, Decision};
use coastline_entity::community::{Community, CommunityAlert};
use coastline_entity::favorite::FavoriteTarget;
use coastline_entity::friend::{FriendRequest, FriendRequestStatus, Friendship};
use coastline_entity::inquiry::PropertyInquiry;
use coastline_entity::market::MarketItem;
use coastline_entity::notification::{NewNotification, Notification};
use coastline_entity::post::{Post, PostReport};
use coastline_entity::profile::{Profile, ProfileUpdate};
use coastline_entity::property::{ListingType, Property};
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem, StickerPackWithItems};
use coastline_entity::verification::VerificationRequest;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<Profile>>;

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<Profile>>;

    async fn insert(&self, profile: &Profile) -> AppResult<Profile>;

    /// Apply the non-empty fields of `update`.
    async fn update(&self, id: UserId, update: &ProfileUpdate) -> AppResult<Option<Profile>>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Community admins assigned to `community`.
    async fn community_admins(&self, community: CommunityId) -> AppResult<Vec<Profile>>;

    /// Members of `community` whose accounts are approved.
    async fn approved_members(&self, community: CommunityId) -> AppResult<Vec<Profile>>;
}

#[async_trait]
pub trait CommunityRepository: Send + Sync {
    async fn find_by_id(&self, id: CommunityId) -> AppResult<Option<Community>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Community>>;

    async fn list(&self) -> AppResult<Vec<Community>>;

    async fn insert(&self, community: &Community) -> AppResult<Community>;
}

/// Pending rows of one kind in one community, for the periodic poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTotal {
    pub community_id: CommunityId,
    pub kind: ApprovalKind,
    pub pending: u64,
}

#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    /// Pending rows of `kind` in `community`, oldest first.
    async fn list_pending(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        page: PageRequest,
    ) -> AppResult<PageResponse<ApprovalItem>>;

    /// Status counts for every kind in `community`.
    async fn counts(&self, community: CommunityId) -> AppResult<Vec<ApprovalCounts>>;

    /// Move a pending row to its decided state, only if it is still pending
    /// and belongs to `community`. Approving a verification request also marks
    /// the submitter's profile as location verified in the same write.
    async fn decide(
        &self,
        community: CommunityId,
        kind: ApprovalKind,
        id: Uuid,
        decision: Decision,
    ) -> AppResult<DecideResult>;

    /// Non-zero pending counts across all communities.
    async fn pending_totals(&self) -> AppResult<Vec<PendingTotal>>;
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn insert(&self, property: &Property) -> AppResult<Property>;

    /// Soft-deleted rows are never returned.
    async fn find(&self, id: PropertyId) -> AppResult<Option<Property>>;

    /// Approved listings in `community`, newest first.
    async fn list_approved(
        &self,
        community: CommunityId,
        listing_type: Option<ListingType>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Property>>;

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<Property>>;

    /// Persist the editable fields and status of a live row.
    async fn update(&self, property: &Property) -> AppResult<Option<Property>>;

    /// Set `deleted_at`. Returns whether a live row was withdrawn.
    async fn soft_delete(&self, id: PropertyId) -> AppResult<bool>;
}

#[async_trait]
pub trait MarketItemRepository: Send + Sync {
    async fn insert(&self, item: &MarketItem) -> AppResult<MarketItem>;

    async fn find(&self, id: MarketItemId) -> AppResult<Option<MarketItem>>;

    async fn list_approved(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<MarketItem>>;

    async fn list_by_owner(&self, owner: UserId) -> AppResult<Vec<MarketItem>>;

    async fn update(&self, item: &MarketItem) -> AppResult<Option<MarketItem>>;

    async fn soft_delete(&self, id: MarketItemId) -> AppResult<bool>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> AppResult<Post>;

    async fn find(&self, id: PostId) -> AppResult<Option<Post>>;

    /// Top-level posts in `community`: pinned first, then newest.
    async fn list_feed(&self, community: CommunityId, page: PageRequest)
    -> AppResult<PageResponse<Post>>;

    async fn set_pinned(&self, id: PostId, pinned: bool) -> AppResult<Option<Post>>;

    /// Hard delete, including the post's comments and reports.
    async fn delete(&self, id: PostId) -> AppResult<bool>;

    async fn insert_report(&self, report: &PostReport) -> AppResult<PostReport>;

    async fn list_reports(
        &self,
        community: CommunityId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PostReport>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// Newest `limit` notifications for `recipient`.
    async fn latest_for(&self, recipient: UserId, limit: u64) -> AppResult<Vec<Notification>>;

    async fn unread_count(&self, recipient: UserId) -> AppResult<u64>;

    /// Returns whether the notification exists and belongs to `recipient`.
    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> AppResult<bool>;

    /// Returns the number of rows changed.
    async fn mark_all_read(&self, recipient: UserId) -> AppResult<u64>;

    /// Delete read notifications created before `cutoff`.
    async fn purge_read_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn insert_request(&self, request: &FriendRequest) -> AppResult<FriendRequest>;

    async fn find_request(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>>;

    /// A pending request between `a` and `b` in either direction.
    async fn pending_between(&self, a: UserId, b: UserId) -> AppResult<Option<FriendRequest>>;

    /// Set the status of a pending request. `None` if it was not pending.
    async fn respond(
        &self,
        id: FriendRequestId,
        status: FriendRequestStatus,
    ) -> AppResult<Option<FriendRequest>>;

    async fn delete_request(&self, id: FriendRequestId) -> AppResult<bool>;

    async fn incoming(&self, recipient: UserId) -> AppResult<Vec<FriendRequest>>;

    async fn outgoing(&self, sender: UserId) -> AppResult<Vec<FriendRequest>>;

    /// Store the friendship in both directions.
    async fn add_friendship(&self, a: UserId, b: UserId) -> AppResult<()>;

    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool>;

    async fn friends_of(&self, user: UserId) -> AppResult<Vec<Friendship>>;

    /// Remove both directions. Returns whether anything was removed.
    async fn remove_friendship(&self, a: UserId, b: UserId) -> AppResult<bool>;
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn insert(&self, request: &VerificationRequest) -> AppResult<VerificationRequest>;

    async fn latest_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>>;

    async fn pending_for(&self, user: UserId) -> AppResult<Option<VerificationRequest>>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert unless present. Returns whether a row was created.
    async fn add(&self, user: UserId, target: FavoriteTarget, community: CommunityId)
    -> AppResult<bool>;

    /// Returns whether a row was removed.
    async fn remove(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool>;

    async fn is_favorite(&self, user: UserId, target: FavoriteTarget) -> AppResult<bool>;

    async fn list(&self, user: UserId) -> AppResult<Vec<FavoriteTarget>>;
}

#[async_trait]
pub trait StickerRepository: Send + Sync {
    async fn insert_sticker(&self, sticker: &Sticker) -> AppResult<Sticker>;

    async fn find_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>>;

    async fn list_stickers(
        &self,
        community: CommunityId,
        category: Option<&str>,
        approved_only: bool,
    ) -> AppResult<Vec<Sticker>>;

    async fn approve_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>>;

    /// Hard delete, including pack memberships.
    async fn delete_sticker(&self, id: StickerId) -> AppResult<bool>;

    async fn insert_pack(&self, pack: &StickerPack) -> AppResult<StickerPack>;

    async fn find_pack(&self, id: StickerPackId) -> AppResult<Option<StickerPack>>;

    async fn list_packs(&self, community: CommunityId) -> AppResult<Vec<StickerPackWithItems>>;

    /// Append to the end of the pack. `None` if the sticker is already in it.
    async fn add_to_pack(
        &self,
        pack: StickerPackId,
        sticker: StickerId,
    ) -> AppResult<Option<StickerPackItem>>;
}

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn insert(&self, inquiry: &PropertyInquiry) -> AppResult<PropertyInquiry>;

    async fn list_for_seller(
        &self,
        seller: UserId,
        page: PageRequest,
    ) -> AppResult<PageResponse<PropertyInquiry>>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert(&self, alert: &CommunityAlert) -> AppResult<CommunityAlert>;

    /// Alerts in `community` that have not expired at `now`, newest first.
    async fn active(&self, community: CommunityId, now: DateTime<Utc>)
    -> AppResult<Vec<CommunityAlert>>;
}
