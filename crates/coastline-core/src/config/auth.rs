//! Session verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying access tokens issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret the auth service signs access tokens with.
    #[serde(default)]
    pub jwt_secret: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Clock skew tolerance in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            audience: default_audience(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    5
}
