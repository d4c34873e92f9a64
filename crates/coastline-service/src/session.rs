//! Bearer token to request context.

use std::sync::Arc;

use tracing::debug;

use coastline_auth::JwtDecoder;
use coastline_core::AppError;
use coastline_core::AppResult;
use coastline_database::repository::ProfileRepository;

use crate::context::RequestContext;

/// Verifies access tokens and loads the caller's profile.
#[derive(Clone)]
pub struct SessionResolver {
    decoder: Arc<JwtDecoder>,
    profiles: Arc<dyn ProfileRepository>,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver").finish_non_exhaustive()
    }
}

impl SessionResolver {
    pub fn new(decoder: Arc<JwtDecoder>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { decoder, profiles }
    }

    /// Verify `token` and build the context for its subject.
    ///
    /// A valid token whose user has no profile row is treated as
    /// unauthenticated.
    pub async fn resolve(&self, token: &str) -> AppResult<RequestContext> {
        let claims = self.decoder.decode(token)?;
        let user_id = claims.user_id();
        let profile = self.profiles.find_by_id(user_id).await?.ok_or_else(|| {
            debug!(user_id = %user_id, "Token subject has no profile");
            AppError::authentication("No profile exists for this session")
        })?;
        Ok(RequestContext::new(profile))
    }
}
