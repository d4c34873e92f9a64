//! Translation API configuration.

use serde::{Deserialize, Serialize};

/// Third-party translation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Endpoint URL; translation is disabled when unset.
    #[serde(default)]
    pub url: Option<String>,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl TranslationConfig {
    /// Whether both the endpoint and key are present.
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

fn default_timeout() -> u64 {
    15
}
