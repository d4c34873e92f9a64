//! Shared test helpers for integration tests.
//!
//! Every test gets its own in-memory data store and a temporary directory
//! for object storage, so nothing needs a running PostgreSQL.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use coastline_api::{AppState, build_app};
use coastline_auth::JwtEncoder;
use coastline_core::config::AppConfig;
use coastline_core::types::{CommunityId, UserId};
use coastline_database::Database;
use coastline_database::memory::MemoryStore;
use coastline_entity::approval::ApprovalStatus;
use coastline_entity::community::Community;
use coastline_entity::profile::{Profile, ProfileRole};
use coastline_storage::StorageManager;
use coastline_storage::providers::LocalStorage;

pub const JWT_SECRET: &str = "integration-test-secret-with-enough-length";
pub const BOUNDARY: &str = "coastline-test-boundary";

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub db: Database,
    pub community: Community,
    pub storage_dir: TempDir,
    encoder: JwtEncoder,
}

/// Status and parsed JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let storage_dir = tempfile::tempdir().expect("tempdir");

        let mut config = AppConfig::default();
        config.auth.jwt_secret = JWT_SECRET.to_string();
        config.database.provider = "memory".to_string();
        config.storage.provider = "local".to_string();
        config.storage.local_root = storage_dir.path().to_string_lossy().into_owned();
        config.worker.enabled = false;

        let store = Arc::new(MemoryStore::new());
        let db = Database::from_memory(store.clone());
        let local = LocalStorage::new(storage_dir.path(), "/media")
            .await
            .expect("local storage");
        let storage = StorageManager::new(Arc::new(local));

        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, db.clone(), storage).expect("app state");

        let community = db
            .communities
            .insert(&Community {
                id: CommunityId::new(),
                name: "Seal Cove".to_string(),
                slug: "seal-cove".to_string(),
                description: None,
                created_at: Utc::now(),
            })
            .await
            .expect("community");

        Self {
            router: build_app(state),
            store,
            db,
            community,
            storage_dir,
            encoder,
        }
    }

    /// Insert a profile in this app's community.
    pub async fn create_profile(&self, role: ProfileRole, status: ApprovalStatus) -> Profile {
        self.create_profile_in(role, status, Some(self.community.id)).await
    }

    pub async fn create_profile_in(
        &self,
        role: ProfileRole,
        status: ApprovalStatus,
        community: Option<CommunityId>,
    ) -> Profile {
        let id = UserId::new();
        let profile = Profile {
            id,
            username: format!("user_{}", &id.to_string()[24..]),
            full_name: Some("Test User".to_string()),
            email: Some(format!("{id}@example.com")),
            role,
            community_id: community,
            approval_status: status,
            is_location_verified: false,
            avatar_url: None,
            business_name: None,
            created_at: Utc::now(),
        };
        self.db.profiles.insert(&profile).await.expect("profile")
    }

    pub async fn resident(&self) -> Profile {
        self.create_profile(ProfileRole::Resident, ApprovalStatus::Approved)
            .await
    }

    pub async fn admin(&self) -> Profile {
        self.create_profile(ProfileRole::CommunityAdmin, ApprovalStatus::Approved)
            .await
    }

    pub fn token(&self, profile: &Profile) -> String {
        self.encoder
            .issue(profile.id, profile.email.as_deref(), chrono::Duration::minutes(10))
            .expect("token")
    }

    /// A valid token whose subject has no profile row.
    pub fn orphan_token(&self) -> String {
        self.encoder
            .issue(UserId::new(), None, chrono::Duration::minutes(10))
            .expect("token")
    }

    /// Send a JSON request.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    /// Send a multipart request with the given `(name, file_name, bytes)` parts.
    pub async fn multipart(
        &self,
        uri: &str,
        parts: &[(&str, Option<&str>, &[u8])],
        token: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    /// Number of files under the storage root.
    pub fn stored_file_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() { walk(&path) } else { 1 }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.storage_dir.path())
    }
}

pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Smallest byte sequence `image::guess_format` reads as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
