//! Settings API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{SaveSettingRequest, SettingsResponse};
use crate::AppState;

/// GET /api/admin/settings - Get every setting.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsResponse> {
    let settings = state.repo.list_settings().await?;
    success(SettingsResponse { settings })
}

/// POST /api/admin/settings - Upsert one setting by key.
pub async fn save_setting(
    State(state): State<AppState>,
    Json(request): Json<SaveSettingRequest>,
) -> ApiResult<SaveSettingRequest> {
    if request.key.trim().is_empty() {
        return Err(AppError::Validation("Setting key is required".to_string()));
    }

    state.repo.upsert_setting(&request.key, &request.value).await?;
    tracing::info!("Saved setting {}", request.key);
    success(request)
}
