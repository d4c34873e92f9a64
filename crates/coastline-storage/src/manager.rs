//! Storage manager: the configured provider behind one handle.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::info;

use coastline_core::config::storage::StorageConfig;
use coastline_core::error::AppError;
use coastline_core::result::AppResult;
use coastline_core::traits::storage::{ObjectStorage, StoredObject};

use crate::providers::{LocalStorage, SupabaseStorage};

/// Shared handle to the object storage provider selected at startup.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn ObjectStorage>,
}

impl StorageManager {
    pub fn new(provider: Arc<dyn ObjectStorage>) -> Self {
        Self { provider }
    }

    /// Build the provider named by `storage.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn ObjectStorage> = match config.provider.as_str() {
            "supabase" => {
                if config.supabase_url.is_empty() {
                    return Err(AppError::configuration(
                        "storage.supabase_url is required for the supabase provider",
                    ));
                }
                Arc::new(SupabaseStorage::new(
                    &config.supabase_url,
                    &config.supabase_key,
                    Duration::from_secs(config.timeout_seconds),
                )?)
            }
            "local" => Arc::new(LocalStorage::new(&config.local_root, &config.local_public_url).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'"
                )));
            }
        };
        info!(provider = provider.provider_type(), "Object storage ready");
        Ok(Self { provider })
    }

    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        self.provider.upload(bucket, path, data, content_type).await
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.provider.public_url(bucket, path)
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        self.provider.remove(bucket, path).await
    }

    /// Reports `false` instead of failing when the backend is unreachable.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            provider: "local".to_string(),
            local_root: dir.path().to_string_lossy().to_string(),
            ..StorageConfig::default()
        };
        let manager = StorageManager::from_config(&config).await.unwrap();
        assert_eq!(manager.provider_type(), "local");
        assert!(manager.health_check().await);
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            ..StorageConfig::default()
        };
        assert!(StorageManager::from_config(&config).await.is_err());
    }
}
