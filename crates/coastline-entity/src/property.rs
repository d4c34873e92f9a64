//! Property listing entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, PropertyId, UserId};

use crate::approval::ApprovalStatus;

/// Kind of property listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ListingType {
    Rent,
    Sale,
    Lease,
    Vacation,
}

text_enum!(ListingType {
    Rent => "Rent",
    Sale => "Sale",
    Lease => "Lease",
    Vacation => "Vacation",
});

/// A row of the `properties` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: PropertyId,
    /// The seller.
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub listing_type: ListingType,
    pub location: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub approval_status: ApprovalStatus,
    pub image_files: Vec<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the listing is withdrawn; such rows are invisible to reads.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn is_public(&self) -> bool {
        self.deleted_at.is_none() && self.approval_status == ApprovalStatus::Approved
    }
}

/// Seller-supplied fields for creating or editing a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub listing_type: ListingType,
    pub location: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub image_files: Vec<String>,
    pub video_url: Option<String>,
}

impl PropertyDraft {
    /// Build a pending row owned by `user_id`.
    pub fn into_property(self, user_id: UserId, community_id: CommunityId) -> Property {
        let now = Utc::now();
        Property {
            id: PropertyId::new(),
            user_id,
            community_id,
            title: self.title,
            description: self.description,
            price: self.price,
            listing_type: self.listing_type,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            approval_status: ApprovalStatus::Pending,
            image_files: self.image_files,
            video_url: self.video_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Overwrite the editable fields of `property`.
    pub fn apply_to(self, property: &mut Property) {
        property.title = self.title;
        property.description = self.description;
        property.price = self.price;
        property.listing_type = self.listing_type;
        property.location = self.location;
        property.bedrooms = self.bedrooms;
        property.bathrooms = self.bathrooms;
        property.image_files = self.image_files;
        property.video_url = self.video_url;
        property.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_type_is_case_insensitive() {
        assert_eq!("rent".parse::<ListingType>().unwrap(), ListingType::Rent);
        assert_eq!(ListingType::Vacation.to_string(), "Vacation");
        assert!("Barter".parse::<ListingType>().is_err());
    }

    #[test]
    fn test_new_listing_is_pending_and_hidden() {
        let draft = PropertyDraft {
            title: "Dune cottage".into(),
            description: None,
            price: 1450.0,
            listing_type: ListingType::Rent,
            location: None,
            bedrooms: Some(2),
            bathrooms: Some(1),
            image_files: vec![],
            video_url: None,
        };
        let property = draft.into_property(UserId::new(), CommunityId::new());
        assert_eq!(property.approval_status, ApprovalStatus::Pending);
        assert!(!property.is_public());
    }
}
