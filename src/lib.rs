//! Roster admin
//!
//! Page controllers for the golfer roster and the form settings editor, the
//! sync core they share, and the backend serving the store and admin API they
//! talk to.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod editor;
pub mod errors;
pub mod import;
pub mod media;
pub mod models;
pub mod pages;
pub mod sync;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use media::{BlobStore, MEDIA_ROUTE};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub media: Arc<BlobStore>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let api_routes = Router::new()
        // Table store
        .route(
            "/rest/{table}",
            get(api::select_rows)
                .post(api::insert_rows)
                .delete(api::delete_rows),
        )
        // Settings
        .route(
            "/admin/settings",
            get(api::get_settings).post(api::save_setting),
        )
        // Backgrounds
        .route("/admin/backgrounds", get(api::list_backgrounds))
        .route(
            "/admin/backgrounds/upload",
            post(api::upload_background).layer(upload_limit),
        )
        .route("/admin/backgrounds/delete", post(api::delete_background))
        // Editor
        .route("/admin/editor", get(api::editor_config));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .nest_service(MEDIA_ROUTE, ServeDir::new(state.media.root()))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod testing;
