//! Hosted backend storage provider over its REST API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use coastline_core::error::{AppError, ErrorKind};
use coastline_core::result::AppResult;
use coastline_core::traits::storage::{ObjectStorage, StoredObject};

use super::check_object_path;

/// Client for `{url}/storage/v1`.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build storage client", e)
        })?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Use an existing client, sharing its connection pool.
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
    }
}

fn transport_error(action: &str, e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("Storage {action} failed: {e}"), e)
}

async fn status_error(action: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(action, status = status.as_u16(), body = %body, "Storage API returned an error");
    if status == StatusCode::CONFLICT {
        return AppError::conflict(format!("Storage {action} rejected: object already exists"));
    }
    AppError::external(format!("Storage {action} failed with status {status}"))
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    fn provider_type(&self) -> &str {
        "supabase"
    }

    async fn health_check(&self) -> AppResult<bool> {
        let response = self
            .authorized(self.client.get(format!("{}/storage/v1/bucket", self.base_url)))
            .send()
            .await
            .map_err(|e| transport_error("health check", e))?;
        Ok(response.status().is_success())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        check_object_path(path)?;
        let size = data.len();
        let response = self
            .authorized(self.client.post(self.object_url(bucket, path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        if !response.status().is_success() {
            return Err(status_error("upload", response).await);
        }

        debug!(bucket, path, bytes = size, "Uploaded object");
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        )
    }

    async fn remove(&self, bucket: &str, path: &str) -> AppResult<()> {
        check_object_path(path)?;
        let response = self
            .authorized(self.client.delete(self.object_url(bucket, path)))
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;

        match response.status() {
            s if s.is_success() || s == StatusCode::NOT_FOUND => Ok(()),
            _ => Err(status_error("delete", response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let storage = SupabaseStorage::with_client(Client::new(), "https://demo.supabase.co/", "anon");
        assert_eq!(
            storage.object_url("avatars", "/u1/a.png"),
            "https://demo.supabase.co/storage/v1/object/avatars/u1/a.png"
        );
        assert_eq!(
            storage.public_url("propertyimages", "u1/b.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/propertyimages/u1/b.jpg"
        );
    }
}
