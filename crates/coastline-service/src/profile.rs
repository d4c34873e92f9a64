//! Profile reads, self-service edits and removal.

use std::sync::Arc;

use tracing::info;

use coastline_auth::Action;
use coastline_core::types::UserId;
use coastline_core::{AppError, AppResult};
use coastline_database::repository::ProfileRepository;
use coastline_entity::profile::{Profile, ProfileUpdate};

use crate::context::RequestContext;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// The caller's profile as currently stored.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<Profile> {
        self.get(ctx.user_id()).await
    }

    pub async fn get(&self, id: UserId) -> AppResult<Profile> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Profile {id} not found")))
    }

    pub async fn update_me(&self, ctx: &RequestContext, update: ProfileUpdate) -> AppResult<Profile> {
        let update = normalize(update)?;
        let profile = self
            .profiles
            .update(ctx.user_id(), &update)
            .await?
            .ok_or_else(|| AppError::not_found("Your profile no longer exists"))?;
        info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    /// Remove a profile and everything that hangs off it. Superadmin only.
    pub async fn delete_profile(&self, ctx: &RequestContext, id: UserId) -> AppResult<()> {
        let target = self.get(id).await?;
        match target.community_id.or(ctx.profile.community_id) {
            Some(scope) => ctx.require(Action::DeleteProfile, scope)?,
            None if ctx.is_superadmin() => {}
            None => return Err(AppError::authorization("Only a superadmin can delete profiles")),
        }
        if id == ctx.user_id() {
            return Err(AppError::validation("You cannot delete your own profile"));
        }
        if !self.profiles.delete(id).await? {
            return Err(AppError::not_found(format!("Profile {id} not found")));
        }
        info!(user_id = %id, admin_id = %ctx.user_id(), "Profile deleted");
        Ok(())
    }
}

/// Trim fields and check the username and avatar rules.
fn normalize(update: ProfileUpdate) -> AppResult<ProfileUpdate> {
    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
    let update = ProfileUpdate {
        username: trimmed(update.username),
        full_name: trimmed(update.full_name),
        avatar_url: trimmed(update.avatar_url),
        business_name: trimmed(update.business_name),
    };

    if let Some(username) = &update.username {
        let len = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            return Err(AppError::validation(format!(
                "Username must be {USERNAME_MIN} to {USERNAME_MAX} characters"
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AppError::validation(
                "Username may only contain letters, digits, '_', '.' and '-'",
            ));
        }
    }
    if let Some(url) = &update.avatar_url {
        let ok = url.is_empty()
            || url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with('/');
        if !ok {
            return Err(AppError::validation("Avatar must be an http(s) URL or a storage path"));
        }
    }
    Ok(update)
}
