//! Configuration module for the roster admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default upload limit for background images (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A configuration variable was present but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding uploaded background images
    pub media_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Externally visible base URL used to build image public URLs
    pub public_url: Option<String>,
    /// Maximum accepted size of an uploaded image, in bytes
    pub max_upload_bytes: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("ROSTER_DB_PATH")
            .unwrap_or_else(|_| "./data/roster.sqlite".to_string())
            .into();

        let media_dir = env::var("ROSTER_MEDIA_DIR")
            .unwrap_or_else(|_| "./data/media".to_string())
            .into();

        let bind_raw =
            env::var("ROSTER_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError {
            name: "ROSTER_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let public_url = env::var("ROSTER_PUBLIC_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let max_upload_bytes = match env::var("ROSTER_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError {
                name: "ROSTER_MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let log_level = env::var("ROSTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            db_path,
            media_dir,
            bind_addr,
            public_url,
            max_upload_bytes,
            log_level,
        })
    }

    /// Base URL that uploaded images are served from.
    pub fn public_base_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind_addr))
    }
}
