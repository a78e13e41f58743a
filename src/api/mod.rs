//! REST API module.
//!
//! Serves the table store, settings and background endpoints the admin pages
//! talk to.

mod backgrounds;
mod editor;
mod settings;
mod store;

pub use backgrounds::*;
pub use editor::*;
pub use settings::*;
pub use store::*;

use axum::Json;

/// Response type for handlers: a JSON body or an [`AppError`](crate::errors::AppError) envelope.
pub type ApiResult<T> = Result<Json<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}
