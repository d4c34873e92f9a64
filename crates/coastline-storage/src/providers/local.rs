//! Local filesystem storage provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use coastline_core::error::{AppError, ErrorKind};
use coastline_core::result::AppResult;
use coastline_core::traits::storage::{ObjectStorage, StoredObject};

use super::check_object_path;

/// Stores each bucket as a directory under `root`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    /// Prefix for public URLs, e.g. `/media`.
    public_base: String,
}

impl LocalStorage {
    /// Create the provider, creating `root_path` if needed.
    pub async fn new(root_path: impl AsRef<Path>, public_base: &str) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, bucket: &str, path: &str) -> AppResult<PathBuf> {
        check_object_path(bucket)?;
        check_object_path(path)?;
        Ok(self.root.join(bucket).join(path.trim_start_matches('/')))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        let full_path = self.resolve(bucket, path)?;
        self.ensure_parent(&full_path).await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    AppError::conflict(format!("Object already exists: {bucket}/{path}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to create object: {bucket}/{path}"),
                        e,
                    )
                }
            })?;
        file.write_all(&data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write {bucket}/{path}"), e)
        })?;
        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush object", e))?;

        debug!(bucket, path, bytes = data.len(), content_type, "Stored object");
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base,
            bucket,
            path.trim_start_matches('/')
        )
    }

    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        let full_path = self.resolve(bucket, path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {bucket}/{path}"),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/media/").await.unwrap();

        let stored = storage
            .upload("avatars", "u1/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(stored.public_url, "/media/avatars/u1/a.png");
        assert!(dir.path().join("avatars/u1/a.png").exists());

        storage.remove("avatars", "u1/a.png").await.unwrap();
        assert!(!dir.path().join("avatars/u1/a.png").exists());
        storage.remove("avatars", "u1/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_existing_object_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/media").await.unwrap();
        storage
            .upload("reactions", "x/y.png", Bytes::from_static(b"one"), "image/png")
            .await
            .unwrap();

        let err = storage
            .upload("reactions", "x/y.png", Bytes::from_static(b"two"), "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(std::fs::read(dir.path().join("reactions/x/y.png")).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/media").await.unwrap();
        let err = storage
            .upload("avatars", "../escape.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
