//! Client for the third-party translation API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use coastline_core::config::translation::TranslationConfig;
use coastline_core::error::{AppError, ErrorKind};
use coastline_core::result::AppResult;

/// Body sent to the translation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    #[serde(default)]
    pub source_language: Option<String>,
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(alias = "translatedText")]
    translated_text: String,
}

/// Endpoint and key, present only when both are configured.
#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    api_key: String,
}

#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    endpoint: Option<Endpoint>,
}

impl TranslationClient {
    pub fn new(config: &TranslationConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build translation client", e)
            })?;
        let endpoint = match (&config.url, &config.api_key) {
            (Some(url), Some(key)) if config.is_configured() => Some(Endpoint {
                url: url.clone(),
                api_key: key.clone(),
            }),
            _ => None,
        };
        Ok(Self { client, endpoint })
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Translate `request.text` into the target language.
    pub async fn translate(&self, request: &TranslationRequest) -> AppResult<String> {
        if request.text.trim().is_empty() {
            return Err(AppError::validation("Text to translate is empty"));
        }
        if request.target_language.trim().is_empty() {
            return Err(AppError::validation("target_language is required"));
        }
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("Translation is not configured"))?;

        let response = self
            .client
            .post(&endpoint.url)
            .bearer_auth(&endpoint.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, format!("Translation request failed: {e}"), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Translation API returned an error");
            return Err(AppError::external(format!(
                "Translation failed with status {status}"
            )));
        }

        let parsed: TranslationResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Translation API returned an unexpected body",
                e,
            )
        })?;
        debug!(
            target_language = %request.target_language,
            chars = parsed.translated_text.chars().count(),
            "Text translated"
        );
        Ok(parsed.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            source_language: None,
            target_language: "es".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let client = TranslationClient::new(&TranslationConfig::default()).unwrap();
        assert!(!client.is_enabled());
        let err = client.translate(&request("High tide at noon")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid() {
        let config = TranslationConfig {
            url: Some("http://127.0.0.1:9/translate".into()),
            api_key: Some("key".into()),
            ..TranslationConfig::default()
        };
        let client = TranslationClient::new(&config).unwrap();
        let err = client.translate(&request("   ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_response_accepts_both_spellings() {
        let a: TranslationResponse = serde_json::from_str(r#"{"translated_text":"hola"}"#).unwrap();
        let b: TranslationResponse = serde_json::from_str(r#"{"translatedText":"hola"}"#).unwrap();
        assert_eq!(a.translated_text, b.translated_text);
    }
}
