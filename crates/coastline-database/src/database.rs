//! The data-access handle constructed once at startup.

use std::sync::Arc;

use tracing::info;

use coastline_core::AppResult;
use coastline_core::config::DatabaseConfig;
use coastline_core::error::AppError;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::postgres;
use crate::repository::{
    AlertRepository, ApprovalRepository, CommunityRepository, FavoriteRepository,
    FriendRepository, InquiryRepository, MarketItemRepository, NotificationRepository,
    PostRepository, ProfileRepository, PropertyRepository, StickerRepository,
    VerificationRepository,
};

/// One implementation of every repository, sharing one backing store.
#[derive(Clone)]
pub struct Database {
    pub profiles: Arc<dyn ProfileRepository>,
    pub communities: Arc<dyn CommunityRepository>,
    pub approvals: Arc<dyn ApprovalRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub market_items: Arc<dyn MarketItemRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub friends: Arc<dyn FriendRepository>,
    pub verifications: Arc<dyn VerificationRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub stickers: Arc<dyn StickerRepository>,
    pub inquiries: Arc<dyn InquiryRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("provider", &self.provider())
            .finish()
    }
}

impl Database {
    /// Build the handle for the configured provider.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Using in-memory data store");
                Ok(Self::in_memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'"
            ))),
        }
    }

    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            profiles: Arc::new(postgres::PgProfileRepository::new(pg.clone())),
            communities: Arc::new(postgres::PgCommunityRepository::new(pg.clone())),
            approvals: Arc::new(postgres::PgApprovalRepository::new(pg.clone())),
            properties: Arc::new(postgres::PgPropertyRepository::new(pg.clone())),
            market_items: Arc::new(postgres::PgMarketItemRepository::new(pg.clone())),
            posts: Arc::new(postgres::PgPostRepository::new(pg.clone())),
            notifications: Arc::new(postgres::PgNotificationRepository::new(pg.clone())),
            friends: Arc::new(postgres::PgFriendRepository::new(pg.clone())),
            verifications: Arc::new(postgres::PgVerificationRepository::new(pg.clone())),
            favorites: Arc::new(postgres::PgFavoriteRepository::new(pg.clone())),
            stickers: Arc::new(postgres::PgStickerRepository::new(pg.clone())),
            inquiries: Arc::new(postgres::PgInquiryRepository::new(pg.clone())),
            alerts: Arc::new(postgres::PgAlertRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Repositories backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::default()))
    }

    /// Repositories backed by an existing [`MemoryStore`].
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            profiles: store.clone(),
            communities: store.clone(),
            approvals: store.clone(),
            properties: store.clone(),
            market_items: store.clone(),
            posts: store.clone(),
            notifications: store.clone(),
            friends: store.clone(),
            verifications: store.clone(),
            favorites: store.clone(),
            stickers: store.clone(),
            inquiries: store.clone(),
            alerts: store,
            pool: None,
        }
    }

    pub fn provider(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// PostgreSQL pool, when that provider is active.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
