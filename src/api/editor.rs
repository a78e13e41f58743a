//! Editor configuration endpoint.

use super::{success, ApiResult};
use crate::editor::EditorConfig;

/// GET /api/admin/editor - Rich-text editor formats and font sizes.
pub async fn editor_config() -> ApiResult<EditorConfig> {
    success(EditorConfig::default())
}
