//! Object storage and upload policy configuration.

use serde::{Deserialize, Serialize};

/// Object storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider: `"supabase"` or `"local"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the hosted backend (`https://<project>.supabase.co`).
    #[serde(default)]
    pub supabase_url: String,
    /// API key used for storage requests.
    #[serde(default)]
    pub supabase_key: String,
    /// Root directory for the local provider.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Public URL prefix the local provider hands out.
    #[serde(default = "default_local_public_url")]
    pub local_public_url: String,
    /// Storage request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            local_root: default_local_root(),
            local_public_url: default_local_public_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Limits applied to one upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Maximum number of files per batch.
    pub max_files: usize,
    /// Maximum size of a single file in megabytes.
    pub max_file_size_mb: u64,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadLimits {
    fn new(max_files: usize, max_file_size_mb: u64, extensions: &[&str]) -> Self {
        Self {
            max_files,
            max_file_size_mb,
            allowed_extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Maximum size of a single file in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Per-widget upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub property_images: UploadLimits,
    pub property_videos: UploadLimits,
    pub feed_images: UploadLimits,
    pub feed_videos: UploadLimits,
    pub feed_files: UploadLimits,
    pub avatars: UploadLimits,
    pub stickers: UploadLimits,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            property_images: UploadLimits::new(10, 10, IMAGE_EXTENSIONS),
            property_videos: UploadLimits::new(1, 100, VIDEO_EXTENSIONS),
            feed_images: UploadLimits::new(4, 10, IMAGE_EXTENSIONS),
            feed_videos: UploadLimits::new(1, 50, VIDEO_EXTENSIONS),
            feed_files: UploadLimits::new(3, 20, &["pdf", "doc", "docx", "txt", "xlsx", "csv"]),
            avatars: UploadLimits::new(1, 5, IMAGE_EXTENSIONS),
            stickers: UploadLimits::new(1, 2, &["png", "gif", "webp", "jpg", "jpeg"]),
        }
    }
}

fn default_provider() -> String {
    "supabase".to_string()
}

fn default_local_root() -> String {
    "./data/storage".to_string()
}

fn default_local_public_url() -> String {
    "/media".to_string()
}

fn default_timeout() -> u64 {
    60
}
