//! `AuthUser` extractor: verifies the bearer token and loads the caller's profile.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use coastline_core::AppError;
use coastline_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Caller context when a token was sent, `None` for anonymous requests.
///
/// A token that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<RequestContext>);

impl OptionalAuthUser {
    pub fn context(&self) -> Option<&RequestContext> {
        self.0.as_ref()
    }
}

async fn resolve(parts: &mut Parts, state: &AppState) -> Result<Option<RequestContext>, ApiError> {
    if !parts.headers.contains_key(AUTHORIZATION) {
        return Ok(None);
    }

    let TypedHeader(header) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::authentication("Invalid Authorization header format"))?;

    let ctx = state.sessions.resolve(header.token()).await?;
    Ok(Some(ctx))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Missing Authorization header").into())
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(resolve(parts, state).await?))
    }
}
