//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use coastline_core::types::{CommunityId, NotificationId, PropertyId, StickerId, UserId};
use coastline_entity::approval::Decision;
use coastline_entity::inquiry::NewInquiry;
use coastline_entity::market::MarketItemDraft;
use coastline_entity::profile::ProfileUpdate;
use coastline_entity::property::{ListingType, PropertyDraft};
use coastline_entity::verification::AddressSubmission;

/// `PUT /api/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 120))]
    pub full_name: Option<String>,
    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 120))]
    pub business_name: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            username: req.username,
            full_name: req.full_name,
            avatar_url: req.avatar_url,
            business_name: req.business_name,
        }
    }
}

/// Body of an approval decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// `POST /api/properties` and `PUT /api/properties/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PropertyRequest {
    /// Only honoured for superadmins.
    #[serde(default)]
    pub community_id: Option<CommunityId>,
    #[validate(length(min = 1, max = 120, message = "Title must be 1 to 120 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: f64,
    pub listing_type: ListingType,
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub image_files: Vec<String>,
    pub video_url: Option<String>,
}

impl PropertyRequest {
    pub fn into_parts(self) -> (Option<CommunityId>, PropertyDraft) {
        let draft = PropertyDraft {
            title: self.title,
            description: self.description,
            price: self.price,
            listing_type: self.listing_type,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            image_files: self.image_files,
            video_url: self.video_url,
        };
        (self.community_id, draft)
    }
}

/// `POST /api/market` and `PUT /api/market/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarketItemRequest {
    #[serde(default)]
    pub community_id: Option<CommunityId>,
    #[validate(length(min = 1, max = 120, message = "Title must be 1 to 120 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: f64,
    pub category: Option<String>,
    pub condition: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub image_files: Vec<String>,
}

impl MarketItemRequest {
    pub fn into_parts(self) -> (Option<CommunityId>, MarketItemDraft) {
        let draft = MarketItemDraft {
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            condition: self.condition,
            image_files: self.image_files,
        };
        (self.community_id, draft)
    }
}

/// `POST /api/properties/inquiry`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InquiryRequest {
    pub community_id: CommunityId,
    pub property_id: PropertyId,
    pub seller_id: UserId,
    pub sender_id: UserId,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

impl From<InquiryRequest> for NewInquiry {
    fn from(req: InquiryRequest) -> Self {
        NewInquiry {
            community_id: req.community_id,
            property_id: req.property_id,
            seller_id: req.seller_id,
            sender_id: req.sender_id,
            name: req.name,
            email: req.email,
            phone: req.phone,
            message: req.message,
        }
    }
}

/// Query for public listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Defaults to the caller's community.
    pub community_id: Option<CommunityId>,
    pub listing_type: Option<ListingType>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinRequest {
    #[serde(default = "default_true")]
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportPostRequest {
    #[validate(length(min = 1, max = 1000, message = "A reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FriendRequestBody {
    pub recipient_id: UserId,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RespondFriendRequest {
    pub accept: bool,
}

/// `POST /api/verification`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerificationBody {
    #[validate(length(min = 1, max = 200, message = "Street address is required"))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 16, message = "Postal code is required"))]
    pub postal_code: String,
}

impl From<VerificationBody> for AddressSubmission {
    fn from(body: VerificationBody) -> Self {
        AddressSubmission {
            street_address: body.street_address,
            city: body.city,
            postal_code: body.postal_code,
        }
    }
}

/// `POST /api/notifications/unseen`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnseenRequest {
    /// Ids the client has already shown.
    #[serde(default)]
    pub seen: Vec<NotificationId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StickerFilter {
    pub category: Option<String>,
    #[serde(default)]
    pub include_pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePackRequest {
    #[validate(length(min = 1, max = 80, message = "Pack name must be 1 to 80 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddPackItemRequest {
    pub sticker_id: StickerId,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inquiry_validation() {
        let mut req = InquiryRequest {
            community_id: CommunityId::new(),
            property_id: PropertyId::new(),
            seller_id: UserId::new(),
            sender_id: UserId::new(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
            message: "Is the cottage still available?".to_string(),
        };
        assert!(req.validate().is_ok());

        req.email = "not-an-email".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let req: PropertyRequest = serde_json::from_value(serde_json::json!({
            "title": "Harbour loft",
            "price": -1.0,
            "listing_type": "Rent"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_pin_defaults_to_true() {
        let req: PinRequest = serde_json::from_str("{}").unwrap();
        assert!(req.pinned);
    }
}
