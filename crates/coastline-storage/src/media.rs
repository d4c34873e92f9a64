//! Upload kinds, their buckets, and batch validation.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coastline_core::config::storage::{UploadLimits, UploadsConfig};
use coastline_core::types::UserId;
use coastline_core::{AppError, AppResult};

/// What an upload is for. Each kind has its own bucket and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    PropertyImage,
    PropertyVideo,
    FeedImage,
    FeedVideo,
    FeedFile,
    Avatar,
    Sticker,
}

impl MediaKind {
    pub const ALL: &'static [MediaKind] = &[
        Self::PropertyImage,
        Self::PropertyVideo,
        Self::FeedImage,
        Self::FeedVideo,
        Self::FeedFile,
        Self::Avatar,
        Self::Sticker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertyImage => "property_image",
            Self::PropertyVideo => "property_video",
            Self::FeedImage => "feed_image",
            Self::FeedVideo => "feed_video",
            Self::FeedFile => "feed_file",
            Self::Avatar => "avatar",
            Self::Sticker => "sticker",
        }
    }

    pub fn bucket(&self) -> &'static str {
        match self {
            Self::PropertyImage => "propertyimages",
            Self::PropertyVideo => "propertyvideos",
            Self::FeedImage => "feedpostimages",
            Self::FeedVideo => "feedpostvideos",
            Self::FeedFile => "feedpostfiles",
            Self::Avatar => "avatars",
            Self::Sticker => "reactions",
        }
    }

    /// Kinds whose content must sniff as an image.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::PropertyImage | Self::FeedImage | Self::Avatar | Self::Sticker
        )
    }

    pub fn limits<'a>(&self, uploads: &'a UploadsConfig) -> &'a UploadLimits {
        match self {
            Self::PropertyImage => &uploads.property_images,
            Self::PropertyVideo => &uploads.property_videos,
            Self::FeedImage => &uploads.feed_images,
            Self::FeedVideo => &uploads.feed_videos,
            Self::FeedFile => &uploads.feed_files,
            Self::Avatar => &uploads.avatars,
            Self::Sticker => &uploads.stickers,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| AppError::validation(format!("Unknown media kind: '{s}'")))
    }
}

/// One file of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Lower-cased extension of the file name.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Declared content type, or one guessed from the extension.
    pub fn resolved_content_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| self.extension().and_then(|ext| mime_for_extension(&ext)))
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// Limits applied to one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub sniff_images: bool,
}

impl UploadPolicy {
    pub fn for_kind(kind: MediaKind, uploads: &UploadsConfig) -> Self {
        let limits = kind.limits(uploads);
        Self {
            max_files: limits.max_files,
            max_file_bytes: limits.max_file_bytes(),
            allowed_extensions: limits
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            sniff_images: kind.is_image(),
        }
    }

    /// Check the whole batch. The first violation is returned.
    pub fn validate(&self, files: &[UploadFile]) -> AppResult<()> {
        if files.is_empty() {
            return Err(AppError::validation("No files were provided"));
        }
        if files.len() > self.max_files {
            return Err(AppError::validation(format!(
                "Too many files: {} provided, at most {} allowed",
                files.len(),
                self.max_files
            )));
        }
        for file in files {
            self.validate_file(file)?;
        }
        Ok(())
    }

    fn validate_file(&self, file: &UploadFile) -> AppResult<()> {
        let name = &file.file_name;
        let ext = file
            .extension()
            .ok_or_else(|| AppError::validation(format!("'{name}' has no file extension")))?;
        if !self.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(AppError::validation(format!(
                "'{name}' has a disallowed type; allowed: {}",
                self.allowed_extensions.join(", ")
            )));
        }
        if file.data.is_empty() {
            return Err(AppError::validation(format!("'{name}' is empty")));
        }
        if file.data.len() as u64 > self.max_file_bytes {
            return Err(AppError::validation(format!(
                "'{name}' exceeds the {} MB limit",
                self.max_file_bytes / (1024 * 1024)
            )));
        }
        if self.sniff_images {
            let format = image::guess_format(&file.data).map_err(|_| {
                AppError::validation(format!("'{name}' is not a recognised image"))
            })?;
            let matches = format
                .extensions_str()
                .iter()
                .any(|e| self.allowed_extensions.iter().any(|a| a.as_str() == *e));
            if !matches {
                return Err(AppError::validation(format!(
                    "'{name}' content is {format:?}, which is not allowed"
                )));
            }
        }
        Ok(())
    }
}

/// `{user_id}/{uuid}.{ext}`
pub fn object_path(owner: UserId, file: &UploadFile) -> String {
    match file.extension() {
        Some(ext) => format!("{owner}/{}.{ext}", Uuid::new_v4()),
        None => format!("{owner}/{}", Uuid::new_v4()),
    }
}

/// `{community_slug}/{category}/{section}/{filename}`
pub fn sticker_path(community_slug: &str, category: &str, section: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        path_segment(community_slug),
        path_segment(category),
        path_segment(section),
        path_segment(file_name)
    )
}

/// Lower-case a segment and replace anything outside `[a-z0-9._-]`.
fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '-',
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.').to_string();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

fn mime_for_extension(ext: &str) -> Option<String> {
    let mime = match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn png(name: &str) -> UploadFile {
        UploadFile::new(name, Bytes::from_static(PNG))
    }

    #[test]
    fn test_kind_parsing_and_buckets() {
        assert_eq!("property-image".parse::<MediaKind>().unwrap(), MediaKind::PropertyImage);
        assert_eq!(MediaKind::Sticker.bucket(), "reactions");
        assert_eq!(MediaKind::FeedFile.bucket(), "feedpostfiles");
        assert!("banner".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_batch_over_limit_rejected() {
        let policy = UploadPolicy::for_kind(MediaKind::FeedImage, &UploadsConfig::default());
        let files: Vec<UploadFile> = (0..5).map(|i| png(&format!("{i}.png"))).collect();
        assert!(policy.validate(&files).is_err());
        assert!(policy.validate(&files[..4]).is_ok());
    }

    #[test]
    fn test_content_must_match_image_kind() {
        let policy = UploadPolicy::for_kind(MediaKind::Avatar, &UploadsConfig::default());
        let fake = UploadFile::new("me.png", Bytes::from_static(b"not an image"));
        assert!(policy.validate(&[fake]).is_err());
        assert!(policy.validate(&[png("me.PNG")]).is_ok());
    }

    #[test]
    fn test_extension_and_size_checks() {
        let mut uploads = UploadsConfig::default();
        uploads.feed_files.max_file_size_mb = 0;
        let policy = UploadPolicy::for_kind(MediaKind::FeedFile, &uploads);
        let doc = UploadFile::new("minutes.pdf", Bytes::from_static(b"%PDF-1.7"));
        assert!(policy.validate(&[doc]).is_err());

        let policy = UploadPolicy::for_kind(MediaKind::FeedFile, &UploadsConfig::default());
        let exe = UploadFile::new("tool.exe", Bytes::from_static(b"MZ"));
        assert!(policy.validate(&[exe]).is_err());
        let empty = UploadFile::new("notes.txt", Bytes::new());
        assert!(policy.validate(&[empty]).is_err());
    }

    #[test]
    fn test_paths() {
        let owner = UserId::new();
        let path = object_path(owner, &png("Beach.JPG"));
        assert!(path.starts_with(&format!("{owner}/")));
        assert!(path.ends_with(".jpg"));

        assert_eq!(
            sticker_path("Seal Cove", "Sea Life", "crabs", "Happy Crab!.png"),
            "seal-cove/sea-life/crabs/happy-crab-.png"
        );
    }
}
