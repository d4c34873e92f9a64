//! Token signing for local development and tests.
//!
//! Production tokens are issued by the hosted backend; this encoder signs
//! tokens with the same secret and claims layout.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use coastline_core::config::auth::AuthConfig;
use coastline_core::error::AppError;
use coastline_core::types::UserId;

use super::claims::Claims;

#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    audience: String,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            audience: config.audience.clone(),
        }
    }

    /// Sign an access token for `user` valid for `ttl`.
    pub fn issue(&self, user: UserId, email: Option<&str>, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.0,
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))
    }
}
