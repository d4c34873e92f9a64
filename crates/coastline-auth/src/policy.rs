//! Community access policy.
//!
//! Every guarded service operation calls [`Policy::require`] before it
//! touches the store. The same table backs `GET /communities/{id}/access`,
//! which the UI uses to decide what to show.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use coastline_core::types::{CommunityId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_entity::profile::{Profile, ProfileRole};

/// The caller, reduced to what the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ProfileRole,
    pub community_id: Option<CommunityId>,
    pub approved: bool,
}

impl Actor {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.id,
            role: profile.role,
            community_id: profile.community_id,
            approved: profile.is_approved(),
        }
    }

    /// Community admin of `community`, or superadmin.
    pub fn administers(&self, community: CommunityId) -> bool {
        match self.role {
            ProfileRole::SuperAdmin => true,
            ProfileRole::CommunityAdmin => self.community_id == Some(community),
            _ => false,
        }
    }

    /// Approved member of `community`. Superadmins count as members everywhere.
    pub fn participates_in(&self, community: CommunityId) -> bool {
        self.role.is_superadmin() || (self.community_id == Some(community) && self.approved)
    }
}

/// Guarded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read and decide the approval queues.
    ReviewApprovals,
    /// Create listings, posts and stickers.
    Contribute,
    /// Post an announcement.
    Announce,
    /// Pin posts and read reports.
    ModerateFeed,
    /// Remove other people's posts and listings.
    RemoveContent,
    CreateAlert,
    /// Approve and delete stickers, build packs.
    ManageStickers,
    /// Delete any profile.
    DeleteProfile,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Self::ReviewApprovals,
        Self::Contribute,
        Self::Announce,
        Self::ModerateFeed,
        Self::RemoveContent,
        Self::CreateAlert,
        Self::ManageStickers,
        Self::DeleteProfile,
    ];
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum PolicyDecision {
    Allow,
    Deny(String),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// What the caller may do in one community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessReport {
    pub community_id: CommunityId,
    pub is_member: bool,
    pub is_admin: bool,
    pub actions: BTreeMap<Action, bool>,
}

/// Stateless policy evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy;

impl Policy {
    pub fn evaluate(actor: &Actor, action: Action, community: CommunityId) -> PolicyDecision {
        let allowed = match action {
            Action::DeleteProfile => actor.role.is_superadmin(),
            Action::ReviewApprovals
            | Action::Announce
            | Action::ModerateFeed
            | Action::RemoveContent
            | Action::CreateAlert
            | Action::ManageStickers => actor.administers(community),
            Action::Contribute => actor.participates_in(community),
        };
        if allowed {
            return PolicyDecision::Allow;
        }

        let reason = match action {
            Action::DeleteProfile => "Only a superadmin can delete profiles".to_string(),
            Action::Contribute if actor.community_id == Some(community) => {
                "Your account is awaiting approval".to_string()
            }
            Action::Contribute => "You are not a member of this community".to_string(),
            _ => format!("{action:?} requires an admin of this community"),
        };
        PolicyDecision::Deny(reason)
    }

    /// Evaluate and turn a denial into an authorization error.
    pub fn require(actor: &Actor, action: Action, community: CommunityId) -> AppResult<()> {
        match Self::evaluate(actor, action, community) {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(reason) => {
                tracing::debug!(
                    user_id = %actor.user_id,
                    community_id = %community,
                    ?action,
                    "Policy denied action"
                );
                Err(AppError::authorization(reason))
            }
        }
    }

    pub fn access_report(actor: &Actor, community: CommunityId) -> AccessReport {
        AccessReport {
            community_id: community,
            is_member: actor.participates_in(community),
            is_admin: actor.administers(community),
            actions: Action::ALL
                .iter()
                .map(|&action| (action, Self::evaluate(actor, action, community).is_allowed()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coastline_core::error::ErrorKind;

    fn actor(role: ProfileRole, community: Option<CommunityId>, approved: bool) -> Actor {
        Actor {
            user_id: UserId::new(),
            role,
            community_id: community,
            approved,
        }
    }

    #[test]
    fn test_admin_scoped_to_own_community() {
        let home = CommunityId::new();
        let admin = actor(ProfileRole::CommunityAdmin, Some(home), true);

        assert!(Policy::evaluate(&admin, Action::ReviewApprovals, home).is_allowed());
        let err = Policy::require(&admin, Action::ReviewApprovals, CommunityId::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(!Policy::evaluate(&admin, Action::DeleteProfile, home).is_allowed());
    }

    #[test]
    fn test_superadmin_everywhere() {
        let root = actor(ProfileRole::SuperAdmin, None, true);
        for &action in Action::ALL {
            assert!(Policy::evaluate(&root, action, CommunityId::new()).is_allowed());
        }
    }

    #[test]
    fn test_pending_resident_cannot_contribute() {
        let home = CommunityId::new();
        let pending = actor(ProfileRole::Resident, Some(home), false);
        assert_eq!(
            Policy::evaluate(&pending, Action::Contribute, home),
            PolicyDecision::Deny("Your account is awaiting approval".to_string())
        );

        let approved = actor(ProfileRole::Resident, Some(home), true);
        let report = Policy::access_report(&approved, home);
        assert!(report.is_member);
        assert!(!report.is_admin);
        assert_eq!(report.actions[&Action::Contribute], true);
        assert_eq!(report.actions[&Action::ReviewApprovals], false);
    }

    #[test]
    fn test_report_serializes_action_names() {
        let home = CommunityId::new();
        let report = Policy::access_report(&actor(ProfileRole::CommunityAdmin, Some(home), true), home);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["actions"]["review_approvals"], true);
        assert_eq!(json["actions"]["delete_profile"], false);
    }
}
