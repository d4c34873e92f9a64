//! Object storage trait for bucket-based file storage.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Bucket name.
    pub bucket: String,
    /// Object path inside the bucket.
    pub path: String,
    /// URL the object can be fetched from without credentials.
    pub public_url: String,
}

/// Backend for bucketed object storage.
///
/// The hosted backend's storage API and a local filesystem provider both
/// implement this trait (see `coastline-storage`).
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Provider type name (e.g. `"supabase"`, `"local"`).
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Upload `data` to `bucket/path`. Existing objects are not overwritten.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<StoredObject>;

    /// Public URL for an object, without checking it exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove an object. Missing objects are not an error.
    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()>;
}
