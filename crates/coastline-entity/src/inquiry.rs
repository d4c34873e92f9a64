//! Property inquiries sent from a listing page to its seller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, InquiryId, PropertyId, UserId};

/// A row of the `property_inquiries` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PropertyInquiry {
    pub id: InquiryId,
    pub community_id: CommunityId,
    pub property_id: PropertyId,
    pub seller_id: UserId,
    pub sender_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of an inquiry as posted by the listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInquiry {
    pub community_id: CommunityId,
    pub property_id: PropertyId,
    pub seller_id: UserId,
    pub sender_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl NewInquiry {
    pub fn into_inquiry(self) -> PropertyInquiry {
        PropertyInquiry {
            id: InquiryId::new(),
            community_id: self.community_id,
            property_id: self.property_id,
            seller_id: self.seller_id,
            sender_id: self.sender_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            message: self.message.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}
