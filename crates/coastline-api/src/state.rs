//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use coastline_auth::JwtDecoder;
use coastline_core::config::AppConfig;
use coastline_core::result::AppResult;
use coastline_database::Database;
use coastline_service::{
    ApprovalService, CommunityService, FeedService, FriendService, MarketService, MediaService,
    NotificationCenter, ProfileService, PropertyService, SessionResolver, StickerService,
    TranslationClient, VerificationService,
};
use coastline_storage::StorageManager;

/// Central state passed to every handler via Axum's `State` extractor.
///
/// Built once at startup around one [`Database`] handle and one
/// [`StorageManager`]; every service shares them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub started_at: Instant,

    pub sessions: Arc<SessionResolver>,
    pub notifications: Arc<NotificationCenter>,
    pub media: Arc<MediaService>,

    pub profiles: Arc<ProfileService>,
    pub communities: Arc<CommunityService>,
    pub approvals: Arc<ApprovalService>,
    pub properties: Arc<PropertyService>,
    pub market: Arc<MarketService>,
    pub feed: Arc<FeedService>,
    pub friends: Arc<FriendService>,
    pub verifications: Arc<VerificationService>,
    pub stickers: Arc<StickerService>,
    pub translator: Arc<TranslationClient>,
}

impl AppState {
    /// Wire every service to the shared data and storage handles.
    pub fn new(config: AppConfig, db: Database, storage: StorageManager) -> AppResult<Self> {
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let sessions = Arc::new(SessionResolver::new(decoder, db.profiles.clone()));

        let notifications = Arc::new(NotificationCenter::new(
            db.notifications.clone(),
            db.profiles.clone(),
            &config.notifications,
        ));
        let media = Arc::new(MediaService::new(storage, config.uploads.clone()));
        let translator = Arc::new(TranslationClient::new(&config.translation)?);

        let profiles = Arc::new(ProfileService::new(db.profiles.clone()));
        let communities = Arc::new(CommunityService::new(
            db.communities.clone(),
            db.alerts.clone(),
            db.profiles.clone(),
            Arc::clone(&notifications),
        ));
        let approvals = Arc::new(ApprovalService::new(
            db.approvals.clone(),
            Arc::clone(&notifications),
        ));
        let properties = Arc::new(PropertyService::new(
            db.properties.clone(),
            db.favorites.clone(),
            db.inquiries.clone(),
            Arc::clone(&notifications),
        ));
        let market = Arc::new(MarketService::new(
            db.market_items.clone(),
            db.favorites.clone(),
        ));
        let feed = Arc::new(FeedService::new(
            db.posts.clone(),
            db.profiles.clone(),
            Arc::clone(&notifications),
        ));
        let friends = Arc::new(FriendService::new(
            db.friends.clone(),
            db.profiles.clone(),
            Arc::clone(&notifications),
        ));
        let verifications = Arc::new(VerificationService::new(db.verifications.clone()));
        let stickers = Arc::new(StickerService::new(
            db.stickers.clone(),
            db.communities.clone(),
            Arc::clone(&media),
        ));

        Ok(Self {
            config: Arc::new(config),
            db,
            started_at: Instant::now(),
            sessions,
            notifications,
            media,
            profiles,
            communities,
            approvals,
            properties,
            market,
            feed,
            friends,
            verifications,
            stickers,
            translator,
        })
    }
}
