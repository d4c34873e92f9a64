//! Batch uploads to the media buckets.

use serde::Serialize;
use tracing::{info, warn};

use coastline_core::config::storage::UploadsConfig;
use coastline_core::traits::storage::StoredObject;
use coastline_core::{AppError, AppResult};
use coastline_storage::media::object_path;
use coastline_storage::{MediaKind, StorageManager, UploadFile, UploadPolicy};

use crate::context::RequestContext;

/// One stored file of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedMedia {
    pub file_name: String,
    pub bucket: String,
    pub path: String,
    pub public_url: String,
}

impl UploadedMedia {
    fn new(file_name: &str, stored: StoredObject) -> Self {
        Self {
            file_name: file_name.to_string(),
            bucket: stored.bucket,
            path: stored.path,
            public_url: stored.public_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaService {
    storage: StorageManager,
    uploads: UploadsConfig,
}

impl MediaService {
    pub fn new(storage: StorageManager, uploads: UploadsConfig) -> Self {
        Self { storage, uploads }
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Check a batch against the limits of `kind` without storing anything.
    pub fn validate(&self, kind: MediaKind, files: &[UploadFile]) -> AppResult<()> {
        UploadPolicy::for_kind(kind, &self.uploads).validate(files)
    }

    /// Validate the whole batch, then upload it in order under the
    /// caller's folder.
    ///
    /// A rejected batch stores nothing. If an upload fails part-way, the
    /// files already stored for this batch are removed again.
    pub async fn upload_batch(
        &self,
        ctx: &RequestContext,
        kind: MediaKind,
        files: Vec<UploadFile>,
    ) -> AppResult<Vec<UploadedMedia>> {
        if kind == MediaKind::Sticker {
            return Err(AppError::validation(
                "Stickers are uploaded through their community",
            ));
        }
        self.validate(kind, &files)?;

        let mut stored = Vec::with_capacity(files.len());
        for file in &files {
            let path = object_path(ctx.user_id(), file);
            match self.store(kind, &path, file).await {
                Ok(object) => stored.push(UploadedMedia::new(&file.file_name, object)),
                Err(e) => {
                    self.rollback(kind, &stored).await;
                    return Err(e);
                }
            }
        }

        info!(
            user_id = %ctx.user_id(),
            %kind,
            count = stored.len(),
            "Media batch uploaded"
        );
        Ok(stored)
    }

    /// Upload one already-validated file to `path` in the bucket of `kind`.
    pub async fn store(&self, kind: MediaKind, path: &str, file: &UploadFile) -> AppResult<StoredObject> {
        self.storage
            .upload(
                kind.bucket(),
                path,
                file.data.clone(),
                &file.resolved_content_type(),
            )
            .await
    }

    /// Remove an object, logging instead of failing.
    pub async fn discard(&self, kind: MediaKind, path: &str) {
        if let Err(e) = self.storage.remove(kind.bucket(), path).await {
            warn!(bucket = kind.bucket(), path, error = %e, "Failed to remove object");
        }
    }

    async fn rollback(&self, kind: MediaKind, stored: &[UploadedMedia]) {
        for media in stored {
            self.discard(kind, &media.path).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, ctx, resident};
    use bytes::Bytes;
    use coastline_core::error::ErrorKind;
    use coastline_storage::providers::LocalStorage;
    use std::sync::Arc;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    async fn service(dir: &tempfile::TempDir) -> MediaService {
        let local = LocalStorage::new(dir.path(), "/media").await.unwrap();
        MediaService::new(StorageManager::new(Arc::new(local)), UploadsConfig::default())
    }

    fn count_files(dir: &std::path::Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .flatten()
            .map(|e| {
                let path = e.path();
                if path.is_dir() { count_files(&path) } else { 1 }
            })
            .sum()
    }

    #[tokio::test]
    async fn test_batch_uploads_in_order() {
        let fx = Fixture::new().await;
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir).await;
        let user = ctx(&fx.add(resident(fx.community.id)).await);

        let files = vec![
            UploadFile::new("front.png", Bytes::from_static(PNG)),
            UploadFile::new("back.png", Bytes::from_static(PNG)),
        ];
        let uploaded = svc.upload_batch(&user, MediaKind::PropertyImage, files).await.unwrap();
        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].file_name, "front.png");
        assert_eq!(uploaded[0].bucket, "propertyimages");
        assert!(uploaded[1].path.starts_with(&user.user_id().to_string()));
        assert!(uploaded[1].public_url.starts_with("/media/propertyimages/"));
        assert_eq!(count_files(dir.path()), 2);
    }

    #[tokio::test]
    async fn test_over_limit_batch_stores_nothing() {
        let fx = Fixture::new().await;
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir).await;
        let user = ctx(&fx.add(resident(fx.community.id)).await);

        let max = UploadsConfig::default().feed_images.max_files;
        let files = (0..=max)
            .map(|i| UploadFile::new(format!("{i}.png"), Bytes::from_static(PNG)))
            .collect();
        let err = svc.upload_batch(&user, MediaKind::FeedImage, files).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(count_files(dir.path()), 0);
    }
}
