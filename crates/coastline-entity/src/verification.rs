//! Location verification requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, UserId, VerificationRequestId};

/// State of a verification request as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(VerificationStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A row of the `verification_requests` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationRequest {
    pub id: VerificationRequestId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub status: VerificationStatus,
    pub reviewer_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Address submitted for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSubmission {
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
}

impl AddressSubmission {
    pub fn into_request(self, user_id: UserId, community_id: CommunityId) -> VerificationRequest {
        VerificationRequest {
            id: VerificationRequestId::new(),
            user_id,
            community_id,
            street_address: self.street_address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_uppercase(),
            status: VerificationStatus::Pending,
            reviewer_note: None,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }
}
