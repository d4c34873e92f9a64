//! Community stickers and sticker packs.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use coastline_auth::Action;
use coastline_core::types::{CommunityId, StickerId, StickerPackId};
use coastline_core::{AppError, AppResult};
use coastline_database::repository::{CommunityRepository, StickerRepository};
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem, StickerPackWithItems};
use coastline_storage::media::sticker_path;
use coastline_storage::{MediaKind, UploadFile};

use crate::context::RequestContext;
use crate::media::MediaService;

/// Metadata sent along with a sticker image.
#[derive(Debug, Clone, Deserialize)]
pub struct StickerUpload {
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub section: String,
}

#[derive(Clone)]
pub struct StickerService {
    stickers: Arc<dyn StickerRepository>,
    communities: Arc<dyn CommunityRepository>,
    media: Arc<MediaService>,
}

impl StickerService {
    pub fn new(
        stickers: Arc<dyn StickerRepository>,
        communities: Arc<dyn CommunityRepository>,
        media: Arc<MediaService>,
    ) -> Self {
        Self {
            stickers,
            communities,
            media,
        }
    }

    /// Store a sticker image under `{slug}/{category}/{section}/{file}`.
    ///
    /// Stickers uploaded by admins are approved straight away.
    pub async fn upload_sticker(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        meta: StickerUpload,
        file: UploadFile,
    ) -> AppResult<Sticker> {
        ctx.require(Action::Contribute, community)?;
        let label = meta.label.trim();
        let category = meta.category.trim();
        if label.is_empty() || category.is_empty() {
            return Err(AppError::validation("Stickers need a label and a category"));
        }
        let section = match meta.section.trim() {
            "" => "general",
            s => s,
        };
        let slug = self
            .communities
            .find_by_id(community)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Community {community} not found")))?
            .slug;

        self.media.validate(MediaKind::Sticker, std::slice::from_ref(&file))?;
        let path = sticker_path(&slug, category, section, &file.file_name);
        let object = self.media.store(MediaKind::Sticker, &path, &file).await?;

        let sticker = Sticker {
            id: StickerId::new(),
            community_id: community,
            label: label.to_string(),
            category: category.to_string(),
            section: section.to_string(),
            src: object.path.clone(),
            public_url: object.public_url,
            uploaded_by: ctx.user_id(),
            is_approved: ctx.administers(community),
            created_at: Utc::now(),
        };
        let sticker = match self.stickers.insert_sticker(&sticker).await {
            Ok(s) => s,
            Err(e) => {
                self.media.discard(MediaKind::Sticker, &object.path).await;
                return Err(e);
            }
        };
        info!(
            sticker_id = %sticker.id,
            community_id = %community,
            approved = sticker.is_approved,
            "Sticker uploaded"
        );
        Ok(sticker)
    }

    /// Approved stickers, optionally within one category. Admins may ask
    /// for pending ones too.
    pub async fn list_stickers(
        &self,
        viewer: Option<&RequestContext>,
        community: CommunityId,
        category: Option<&str>,
        include_pending: bool,
    ) -> AppResult<Vec<Sticker>> {
        let approved_only = match (include_pending, viewer) {
            (false, _) => true,
            (true, Some(ctx)) => {
                ctx.require(Action::ManageStickers, community)?;
                false
            }
            (true, None) => {
                return Err(AppError::authentication("Sign in to see pending stickers"));
            }
        };
        self.stickers
            .list_stickers(community, category, approved_only)
            .await
    }

    pub async fn approve_sticker(&self, ctx: &RequestContext, id: StickerId) -> AppResult<Sticker> {
        let sticker = self.find(id).await?;
        ctx.require(Action::ManageStickers, sticker.community_id)?;
        self.stickers
            .approve_sticker(id)
            .await?
            .ok_or_else(|| sticker_not_found(id))
    }

    /// Delete the row and its stored image.
    pub async fn delete_sticker(&self, ctx: &RequestContext, id: StickerId) -> AppResult<()> {
        let sticker = self.find(id).await?;
        ctx.require(Action::ManageStickers, sticker.community_id)?;
        if !self.stickers.delete_sticker(id).await? {
            return Err(sticker_not_found(id));
        }
        self.media.discard(MediaKind::Sticker, &sticker.src).await;
        info!(sticker_id = %id, admin_id = %ctx.user_id(), "Sticker deleted");
        Ok(())
    }

    pub async fn create_pack(
        &self,
        ctx: &RequestContext,
        community: CommunityId,
        name: &str,
    ) -> AppResult<StickerPack> {
        ctx.require(Action::ManageStickers, community)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Pack name is required"));
        }
        self.stickers
            .insert_pack(&StickerPack {
                id: StickerPackId::new(),
                community_id: community,
                name: name.to_string(),
                created_by: ctx.user_id(),
                created_at: Utc::now(),
            })
            .await
    }

    /// Append an approved sticker of the same community to a pack.
    pub async fn add_to_pack(
        &self,
        ctx: &RequestContext,
        pack: StickerPackId,
        sticker: StickerId,
    ) -> AppResult<StickerPackItem> {
        let found = self
            .stickers
            .find_pack(pack)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sticker pack {pack} not found")))?;
        ctx.require(Action::ManageStickers, found.community_id)?;

        let item = self.find(sticker).await?;
        if item.community_id != found.community_id {
            return Err(AppError::validation("Sticker belongs to another community"));
        }
        if !item.is_approved {
            return Err(AppError::validation("Only approved stickers can be added to packs"));
        }
        self.stickers
            .add_to_pack(pack, sticker)
            .await?
            .ok_or_else(|| AppError::conflict("Sticker is already in this pack"))
    }

    pub async fn list_packs(&self, community: CommunityId) -> AppResult<Vec<StickerPackWithItems>> {
        self.stickers.list_packs(community).await
    }

    async fn find(&self, id: StickerId) -> AppResult<Sticker> {
        self.stickers
            .find_sticker(id)
            .await?
            .ok_or_else(|| sticker_not_found(id))
    }
}

fn sticker_not_found(id: StickerId) -> AppError {
    AppError::not_found(format!("Sticker {id} not found"))
}
