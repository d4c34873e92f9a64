//! Approval workflow shared by profiles, listings, and verification requests.
//!
//! Every approval-gated row starts `pending` and can move exactly once, to
//! `approved` or `declined`. Verification requests spell the declined state
//! `rejected` at rest; [`ApprovalKind::decided_label`] handles the mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coastline_core::types::{CommunityId, UserId};
use coastline_core::{AppError, AppResult};

use crate::notification::NotificationKind;
use crate::notification::TargetType;

/// Approval state of a gated row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    #[serde(alias = "rejected")]
    Declined,
}

text_enum!(ApprovalStatus {
    Pending => "pending",
    Approved => "approved",
    Declined => "declined",
});

impl ApprovalStatus {
    /// Parse a stored label, accepting `rejected` for verification rows.
    pub fn from_label(label: &str) -> AppResult<Self> {
        if label.eq_ignore_ascii_case("rejected") {
            return Ok(Self::Declined);
        }
        label.parse()
    }

    /// Whether a decision can still be taken.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Apply a decision. Only pending rows transition.
    pub fn transition(self, decision: Decision) -> AppResult<Self> {
        match (self, decision) {
            (Self::Pending, Decision::Approve) => Ok(Self::Approved),
            (Self::Pending, Decision::Decline) => Ok(Self::Declined),
            (current, _) => Err(AppError::conflict(format!(
                "Item is already {current} and cannot be {}",
                decision.past_tense()
            ))),
        }
    }
}

/// An admin's verdict on a pending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Decline,
}

impl Decision {
    fn past_tense(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Decline => "declined",
        }
    }
}

/// Entity kinds that pass through the approval queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// Resident profiles.
    User,
    /// Business profiles.
    Business,
    Property,
    MarketItem,
    /// Location verification requests.
    Verification,
}

text_enum!(ApprovalKind {
    User => "user",
    Business => "business",
    Property => "property",
    MarketItem => "market_item",
    Verification => "verification",
});

impl ApprovalKind {
    /// Status label written to the row for a decision.
    pub fn decided_label(&self, decision: Decision) -> &'static str {
        match (self, decision) {
            (_, Decision::Approve) => "approved",
            (Self::Verification, Decision::Decline) => "rejected",
            (_, Decision::Decline) => "declined",
        }
    }

    /// Notification sent to the submitter once a decision lands.
    pub fn outcome_notification(&self, decision: Decision) -> NotificationKind {
        match (self, decision) {
            (Self::User | Self::Business, Decision::Approve) => NotificationKind::AccountApproved,
            (Self::User | Self::Business, Decision::Decline) => NotificationKind::AccountDeclined,
            (Self::Property | Self::MarketItem, Decision::Approve) => {
                NotificationKind::ListingApproved
            }
            (Self::Property | Self::MarketItem, Decision::Decline) => {
                NotificationKind::ListingDeclined
            }
            (Self::Verification, Decision::Approve) => NotificationKind::VerificationApproved,
            (Self::Verification, Decision::Decline) => NotificationKind::VerificationRejected,
        }
    }

    /// Target type recorded on notifications about this kind.
    pub fn target_type(&self) -> TargetType {
        match self {
            Self::User | Self::Business => TargetType::Profile,
            Self::Property => TargetType::Property,
            Self::MarketItem => TargetType::MarketItem,
            Self::Verification => TargetType::Verification,
        }
    }
}

/// A row waiting in (or leaving) the approval queue, projected to a common shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalItem {
    pub id: Uuid,
    pub kind: ApprovalKind,
    pub community_id: CommunityId,
    /// Profile that submitted the row (the profile itself for account approvals).
    pub submitter_id: UserId,
    /// Display title: username, listing title, or street address.
    pub title: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

/// Tab badge counts for one kind in one community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCounts {
    pub kind: ApprovalKind,
    pub pending: u64,
    pub approved: u64,
    pub declined: u64,
}

impl ApprovalCounts {
    /// Zeroed counts for a kind.
    pub fn empty(kind: ApprovalKind) -> Self {
        Self {
            kind,
            pending: 0,
            approved: 0,
            declined: 0,
        }
    }

    /// Increment the bucket matching `status`.
    pub fn record(&mut self, status: ApprovalStatus, n: u64) {
        match status {
            ApprovalStatus::Pending => self.pending += n,
            ApprovalStatus::Approved => self.approved += n,
            ApprovalStatus::Declined => self.declined += n,
        }
    }
}

/// Result of a conditional status update.
#[derive(Debug, Clone)]
pub enum DecideResult {
    /// The row was pending and now carries the new status.
    Updated(ApprovalItem),
    /// No row with that id exists in the community.
    NotFound,
    /// The row exists but was already decided.
    AlreadyDecided(ApprovalStatus),
}
