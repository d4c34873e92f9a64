use async_trait::async_trait;

use coastline_core::AppResult;
use coastline_core::types::{CommunityId, StickerId, StickerPackId};
use coastline_entity::sticker::{Sticker, StickerPack, StickerPackItem, StickerPackWithItems};

use super::MemoryStore;
use crate::repository::StickerRepository;

#[async_trait]
impl StickerRepository for MemoryStore {
    async fn insert_sticker(&self, sticker: &Sticker) -> AppResult<Sticker> {
        self.write().await.stickers.insert(sticker.id, sticker.clone());
        Ok(sticker.clone())
    }

    async fn find_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>> {
        Ok(self.read().await.stickers.get(&id).cloned())
    }

    async fn list_stickers(
        &self,
        community: CommunityId,
        category: Option<&str>,
        approved_only: bool,
    ) -> AppResult<Vec<Sticker>> {
        let tables = self.read().await;
        let mut rows: Vec<Sticker> = tables
            .stickers
            .values()
            .filter(|s| s.community_id == community)
            .filter(|s| category.is_none_or(|c| s.category == c))
            .filter(|s| !approved_only || s.is_approved)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.category, &a.section, &a.label).cmp(&(&b.category, &b.section, &b.label))
        });
        Ok(rows)
    }

    async fn approve_sticker(&self, id: StickerId) -> AppResult<Option<Sticker>> {
        let mut tables = self.write().await;
        Ok(tables.stickers.get_mut(&id).map(|s| {
            s.is_approved = true;
            s.clone()
        }))
    }

    async fn delete_sticker(&self, id: StickerId) -> AppResult<bool> {
        let mut tables = self.write().await;
        tables.pack_items.retain(|i| i.sticker_id != id);
        Ok(tables.stickers.remove(&id).is_some())
    }

    async fn insert_pack(&self, pack: &StickerPack) -> AppResult<StickerPack> {
        self.write().await.packs.insert(pack.id, pack.clone());
        Ok(pack.clone())
    }

    async fn find_pack(&self, id: StickerPackId) -> AppResult<Option<StickerPack>> {
        Ok(self.read().await.packs.get(&id).cloned())
    }

    async fn list_packs(&self, community: CommunityId) -> AppResult<Vec<StickerPackWithItems>> {
        let tables = self.read().await;
        let mut packs: Vec<StickerPack> = tables
            .packs
            .values()
            .filter(|p| p.community_id == community)
            .cloned()
            .collect();
        packs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(packs
            .into_iter()
            .map(|pack| {
                let mut items: Vec<&StickerPackItem> =
                    tables.pack_items.iter().filter(|i| i.pack_id == pack.id).collect();
                items.sort_by_key(|i| i.position);
                let stickers = items
                    .into_iter()
                    .filter_map(|i| tables.stickers.get(&i.sticker_id).cloned())
                    .collect();
                StickerPackWithItems { pack, stickers }
            })
            .collect())
    }

    async fn add_to_pack(
        &self,
        pack: StickerPackId,
        sticker: StickerId,
    ) -> AppResult<Option<StickerPackItem>> {
        let mut tables = self.write().await;
        let members = tables.pack_items.iter().filter(|i| i.pack_id == pack);
        let mut next = 0;
        for item in members {
            if item.sticker_id == sticker {
                return Ok(None);
            }
            next = next.max(item.position + 1);
        }
        let item = StickerPackItem {
            pack_id: pack,
            sticker_id: sticker,
            position: next,
        };
        tables.pack_items.push(item.clone());
        Ok(Some(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coastline_core::types::UserId;

    #[tokio::test]
    async fn test_pack_keeps_insertion_order() {
        let store = MemoryStore::new();
        let community = CommunityId::new();
        let owner = UserId::new();
        let pack = StickerPack {
            id: StickerPackId::new(),
            community_id: community,
            name: "Harbour".into(),
            created_by: owner,
            created_at: Utc::now(),
        };
        store.insert_pack(&pack).await.unwrap();

        let mut ids = Vec::new();
        for label in ["wave", "gull"] {
            let sticker = Sticker {
                id: StickerId::new(),
                community_id: community,
                label: label.into(),
                category: "sea".into(),
                section: "animals".into(),
                src: format!("harbour/sea/animals/{label}.png"),
                public_url: format!("/media/reactions/harbour/sea/animals/{label}.png"),
                uploaded_by: owner,
                is_approved: true,
                created_at: Utc::now(),
            };
            store.insert_sticker(&sticker).await.unwrap();
            store.add_to_pack(pack.id, sticker.id).await.unwrap();
            ids.push(sticker.id);
        }
        assert!(store.add_to_pack(pack.id, ids[0]).await.unwrap().is_none());

        let packs = store.list_packs(community).await.unwrap();
        let order: Vec<StickerId> = packs[0].stickers.iter().map(|s| s.id).collect();
        assert_eq!(order, ids);
    }
}
