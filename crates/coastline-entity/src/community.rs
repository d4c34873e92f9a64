//! Communities (tenants) and their alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coastline_core::types::{AlertId, CommunityId, UserId};

/// A row of the `communities` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    /// URL-safe name, also the first segment of sticker paths.
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Urgency of a community alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Urgent,
}

text_enum!(AlertSeverity {
    Info => "info",
    Warning => "warning",
    Urgent => "urgent",
});

/// A row of the `community_alerts` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommunityAlert {
    pub id: AlertId,
    pub community_id: CommunityId,
    pub author_id: UserId,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CommunityAlert {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }
}
