//! Multipart media upload handler.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Multipart, State};

use coastline_service::UploadedMedia;
use coastline_storage::{MediaKind, UploadFile};

use crate::dto::response::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiPath, AuthUser};
use crate::state::AppState;

/// Files and plain text fields of a multipart body.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    pub files: Vec<UploadFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Any part carrying a file name is a file; the rest are text fields.
pub(crate) async fn read_multipart(mut multipart: Multipart) -> ApiResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Multipart error: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Read error: {}", e.body_text())))?;
                form.files.push(UploadFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Read error: {}", e.body_text())))?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// POST /api/media/{kind}
///
/// Stores every file of the batch, or none of them.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(kind): ApiPath<String>,
    multipart: Multipart,
) -> ApiResult<Json<ApiResponse<Vec<UploadedMedia>>>> {
    let kind: MediaKind = kind.parse()?;
    let form = read_multipart(multipart).await?;
    let uploaded = state.media.upload_batch(&auth, kind, form.files).await?;
    Ok(Json(ApiResponse::ok(uploaded)))
}
