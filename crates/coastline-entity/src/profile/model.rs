//! Profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{CommunityId, UserId};

use super::role::ProfileRole;
use crate::approval::ApprovalStatus;

/// A row of the `profiles` table. `id` equals the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: ProfileRole,
    pub community_id: Option<CommunityId>,
    pub approval_status: ApprovalStatus,
    pub is_location_verified: bool,
    pub avatar_url: Option<String>,
    pub business_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the profile may act in its community.
    pub fn is_approved(&self) -> bool {
        !self.role.requires_approval() || self.approval_status == ApprovalStatus::Approved
    }

    /// Whether the profile belongs to `community`.
    pub fn belongs_to(&self, community: CommunityId) -> bool {
        self.community_id == Some(community)
    }

    /// Name shown in notifications and listings.
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .or(self.full_name.as_deref())
            .unwrap_or(&self.username)
    }
}

/// Self-service profile changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub business_name: Option<String>,
}
