//! Access token verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use coastline_core::config::auth::AuthConfig;
use coastline_core::error::AppError;

use super::claims::Claims;

/// Verifies HS256 tokens signed with the backend's JWT secret.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature, expiry and audience, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Session has expired"),
                JwtErrorKind::InvalidAudience => {
                    AppError::authentication("Token was not issued for this service")
                }
                JwtErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                JwtErrorKind::InvalidToken => AppError::authentication("Invalid token format"),
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;
        Ok(data.claims)
    }
}
