//! Favorites on properties and wishlist entries on market items.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coastline_core::types::{MarketItemId, PropertyId};

/// What a favorite points at. Each target lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum FavoriteTarget {
    /// Stored in `property_favorites`.
    Property(PropertyId),
    /// Stored in `wishlist`.
    MarketItem(MarketItemId),
}

impl FavoriteTarget {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Property(id) => id.0,
            Self::MarketItem(id) => id.0,
        }
    }
}

/// State after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteState {
    pub target: FavoriteTarget,
    pub favorited: bool,
}
