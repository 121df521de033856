//! Upload API endpoints
//!
//! - POST /api/v1/upload/image - Store a post image
//!
//! Images land in `<upload path>/post_images/` under a random name and are
//! served back from `/media/`.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::POST_IMAGES_DIR;

/// Response for successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Path relative to the media root; store it in a post's `image`
    pub image: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload/image", post(upload_image))
}

/// POST /api/v1/upload/image
///
/// Accepts multipart/form-data with a single file field named "file".
async fn upload_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let config = &state.upload_config;
    let dir = config.path.join(POST_IMAGES_DIR);
    ensure_upload_dir(&dir).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "Invalid file type: {}. Allowed types: {:?}",
                content_type, config.allowed_types
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

        if data.is_empty() {
            return Err(ApiError::validation_error("Uploaded file is empty"));
        }
        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} bytes ({} MB)",
                config.max_file_size,
                config.max_file_size / 1024 / 1024
            )));
        }

        let filename = format!("{}.{}", Uuid::new_v4(), config.extension_for(&content_type));
        fs::write(dir.join(&filename), &data)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

        let image = format!("{}/{}", POST_IMAGES_DIR, filename);
        tracing::info!("User {} uploaded {} ({} bytes)", user.0.username, image, data.len());

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: format!("/media/{}", image),
                image,
                size: data.len() as u64,
                content_type,
            }),
        ));
    }

    Err(ApiError::validation_error("No file provided"))
}

async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))
}
