//! Roster admin backend
//!
//! Serves the golfer table store, settings and background image endpoints
//! with SQLite persistence and on-disk image storage.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roster_admin::config::Config;
use roster_admin::db::{self, Repository};
use roster_admin::media::BlobStore;
use roster_admin::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting roster admin backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Media directory: {:?}", config.media_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize image storage
    let media = Arc::new(BlobStore::open(&config.media_dir, config.public_base_url()).await?);
    tracing::info!("Serving images from {}", config.public_base_url());

    let state = AppState {
        repo,
        media,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
