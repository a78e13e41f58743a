//! Background image API endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{BackgroundImage, BackgroundsResponse, DeleteBackgroundRequest};
use crate::AppState;

/// Multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// GET /api/admin/backgrounds - List uploaded images, newest first.
pub async fn list_backgrounds(State(state): State<AppState>) -> ApiResult<BackgroundsResponse> {
    let backgrounds = state.media.list().await?;
    success(BackgroundsResponse { backgrounds })
}

/// POST /api/admin/backgrounds/upload - Store the `image` field of a multipart form.
pub async fn upload_background(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<BackgroundImage> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Expected an image, got {:?}",
                content_type
            )));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded image is empty".to_string()));
        }

        let image = state.media.put(&file_name, &bytes).await?;
        return success(image);
    }

    Err(AppError::BadRequest("No image provided".to_string()))
}

/// POST /api/admin/backgrounds/delete - Remove an image by key.
pub async fn delete_background(
    State(state): State<AppState>,
    Json(request): Json<DeleteBackgroundRequest>,
) -> ApiResult<DeleteBackgroundRequest> {
    state.media.remove(&request.key).await?;
    success(request)
}
