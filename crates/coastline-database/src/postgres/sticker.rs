//! Sticker and sticker pack repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, StickerId, StickerPackId};
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem, StickerPackWithItems};

use crate::query_error;
use crate::repository::StickerRepository;

#[derive(Debug, Clone)]
pub struct PgStickerRepository {
    pool: PgPool,
}

impl PgStickerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PackedSticker {
    pack_id: StickerPackId,
    #[sqlx(flatten)]
    sticker: Sticker,
}

#[async_trait]
impl StickerRepository for PgStickerRepository {
    async fn insert_sticker(&self, sticker: &Sticker) -> AppResult<Sticker> {
        sqlx::query_as::<_, Sticker>(
            "INSERT INTO stickers (id, community_id, label, category, section, src, public_url, \
             uploaded_by, is_approved, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(sticker.id)
        .bind(sticker.community_id)
        .bind(&sticker.label)
        .bind(&sticker.category)
        .bind(&sticker.section)
        .bind(&sticker.src)
        .bind(&sticker.public_url)
        .bind(sticker.uploaded_by)
        .bind(sticker.is_approved)
        .bind(sticker.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert sticker"))
    }

    async fn find_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>> {
        sqlx::query_as::<_, Sticker>("SELECT * FROM stickers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find sticker"))
    }

    async fn list_stickers(
        &self,
        community: CommunityId,
        category: Option<&str>,
        approved_only: bool,
    ) -> AppResult<Vec<Sticker>> {
        sqlx::query_as::<_, Sticker>(
            "SELECT * FROM stickers WHERE community_id = $1 \
             AND ($2::text IS NULL OR category = $2) AND (NOT $3 OR is_approved) \
             ORDER BY category, section, label",
        )
        .bind(community)
        .bind(category)
        .bind(approved_only)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list stickers"))
    }

    async fn approve_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>> {
        sqlx::query_as::<_, Sticker>(
            "UPDATE stickers SET is_approved = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to approve sticker"))
    }

    async fn delete_sticker(&self, id: StickerId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin transaction"))?;
        sqlx::query("DELETE FROM sticker_pack_items WHERE sticker_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to remove sticker from packs"))?;
        let result = sqlx::query("DELETE FROM stickers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error("Failed to delete sticker"))?;
        tx.commit()
            .await
            .map_err(query_error("Failed to commit sticker deletion"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_pack(&self, pack: &StickerPack) -> AppResult<StickerPack> {
        sqlx::query_as::<_, StickerPack>(
            "INSERT INTO sticker_packs (id, community_id, name, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(pack.id)
        .bind(pack.community_id)
        .bind(&pack.name)
        .bind(pack.created_by)
        .bind(pack.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to insert sticker pack"))
    }

    async fn find_pack(&self, id: StickerPackId) -> AppResult<Option<StickerPack>> {
        sqlx::query_as::<_, StickerPack>("SELECT * FROM sticker_packs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find sticker pack"))
    }

    async fn list_packs(&self, community: CommunityId) -> AppResult<Vec<StickerPackWithItems>> {
        let packs = sqlx::query_as::<_, StickerPack>(
            "SELECT * FROM sticker_packs WHERE community_id = $1 ORDER BY name",
        )
        .bind(community)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list sticker packs"))?;

        let pack_ids: Vec<Uuid> = packs.iter().map(|p| p.id.0).collect();
        let rows = sqlx::query_as::<_, PackedSticker>(
            "SELECT i.pack_id, s.* FROM sticker_pack_items i JOIN stickers s ON s.id = i.sticker_id \
             WHERE i.pack_id = ANY($1) ORDER BY i.pack_id, i.position",
        )
        .bind(&pack_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("Failed to list sticker pack items"))?;

        let mut by_pack: HashMap<StickerPackId, Vec<Sticker>> = HashMap::new();
        for row in rows {
            by_pack.entry(row.pack_id).or_default().push(row.sticker);
        }

        Ok(packs
            .into_iter()
            .map(|pack| StickerPackWithItems {
                stickers: by_pack.remove(&pack.id).unwrap_or_default(),
                pack,
            })
            .collect())
    }

    async fn add_to_pack(
        &self,
        pack: StickerPackId,
        sticker: StickerId,
    ) -> AppResult<Option<StickerPackItem>> {
        sqlx::query_as::<_, StickerPackItem>(
            "INSERT INTO sticker_pack_items (pack_id, sticker_id, position) \
             SELECT $1, $2, COALESCE(MAX(position) + 1, 0) FROM sticker_pack_items WHERE pack_id = $1 \
             ON CONFLICT (pack_id, sticker_id) DO NOTHING RETURNING *",
        )
        .bind(pack)
        .bind(sticker)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("Failed to add sticker to pack"))
    }
}
