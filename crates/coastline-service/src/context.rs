//! Request context carrying the caller's profile and policy view.

use chrono::{DateTime, Utc};

use coastline_auth::{Action, Actor, Policy};
use coastline_core::types::{CommunityId, UserId};
use coastline_core::{AppError, AppResult};
use coastline_entity::profile::Profile;

/// Context for the current authenticated request.
///
/// Built by [`SessionResolver`](crate::session::SessionResolver) from the
/// bearer token and passed into every service method that acts on
/// behalf of a user.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The caller's profile as loaded for this request.
    pub profile: Profile,
    /// The profile reduced to what the policy evaluates.
    pub actor: Actor,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(profile: Profile) -> Self {
        Self {
            actor: Actor::from_profile(&profile),
            profile,
            request_time: Utc::now(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.profile.id
    }

    pub fn is_superadmin(&self) -> bool {
        self.profile.role.is_superadmin()
    }

    /// The community the caller is assigned to.
    pub fn home_community(&self) -> AppResult<CommunityId> {
        self.profile
            .community_id
            .ok_or_else(|| AppError::validation("Your profile is not assigned to a community"))
    }

    /// Community a new row should land in.
    ///
    /// Superadmins may name any community; everyone else writes to their own.
    pub fn target_community(&self, requested: Option<CommunityId>) -> AppResult<CommunityId> {
        match requested {
            Some(community) if self.is_superadmin() => Ok(community),
            Some(community) if self.profile.community_id != Some(community) => Err(
                AppError::authorization("You can only post to your own community"),
            ),
            _ => self.home_community(),
        }
    }

    /// Evaluate the community policy for `action`.
    pub fn require(&self, action: Action, community: CommunityId) -> AppResult<()> {
        Policy::require(&self.actor, action, community)
    }

    /// Whether the caller administers `community`.
    pub fn administers(&self, community: CommunityId) -> bool {
        self.actor.administers(community)
    }
}
