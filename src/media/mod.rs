//! Blob storage for background images.
//!
//! Images live as flat files in one directory and are served read-only under
//! `/media/{key}`. Keys start with a millisecond timestamp, so sorting keys in
//! descending order lists the newest upload first.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::errors::AppError;
use crate::models::BackgroundImage;

/// URL prefix the media directory is mounted at.
pub const MEDIA_ROUTE: &str = "/media";

/// On-disk store for uploaded background images.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base: String,
}

impl BlobStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub async fn open(root: &Path, public_base: impl Into<String>) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL an image with `key` is served from.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}/{}", self.public_base, MEDIA_ROUTE, key)
    }

    /// Store `bytes` under a fresh key derived from `file_name`.
    pub async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<BackgroundImage, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let key = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &id[..8],
            sanitize_file_name(file_name)
        );

        tokio::fs::write(self.root.join(&key), bytes).await?;
        tracing::info!("Stored background image {} ({} bytes)", key, bytes.len());

        Ok(self.image(key))
    }

    /// List every stored image, newest first.
    pub async fn list(&self) -> Result<Vec<BackgroundImage>, AppError> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                keys.push(name.to_string());
            }
        }

        keys.sort_unstable_by(|a, b| b.cmp(a));
        Ok(keys.into_iter().map(|key| self.image(key)).collect())
    }

    /// Remove the image stored under `key`.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        validate_key(key)?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => {
                tracing::info!("Removed background image {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                format!("Background {} not found", key),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn image(&self, key: String) -> BackgroundImage {
        BackgroundImage {
            public_url: self.public_url(&key),
            key,
        }
    }
}

/// Reject keys that could escape the media directory.
fn validate_key(key: &str) -> Result<(), AppError> {
    if key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || key.contains("..")
    {
        return Err(AppError::Validation(format!("Invalid key: {:?}", key)));
    }
    Ok(())
}

/// Keep the base name of an uploaded file, replacing anything outside
/// `[A-Za-z0-9._-]` with `_` and collapsing runs of `.`, so the result always
/// passes [`validate_key`].
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim_start_matches('.');

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            c
        } else {
            '_'
        };
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("course photo.JPG"), "course_photo.JPG");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "image");
        assert_eq!(sanitize_file_name("photo..png"), "photo.png");
        assert_eq!(sanitize_file_name("a...b..jpg"), "a.b.jpg");
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("1700000000000-abcd1234-a.png").is_ok());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("a/b.png").is_err());
        assert!(validate_key("").is_err());
    }

    #[tokio::test]
    async fn test_put_list_remove() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path(), "http://localhost:9000/")
            .await
            .unwrap();

        let first = store.put("first.png", b"one").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.put("second.png", b"two").await.unwrap();

        assert!(first.key.ends_with("-first.png"));
        assert_eq!(
            second.public_url,
            format!("http://localhost:9000/media/{}", second.key)
        );

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![second.clone(), first.clone()]);

        store.remove(&first.key).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![second]);

        let missing = store.remove(&first.key).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dotted_file_name_can_be_removed() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path(), "http://localhost:9000")
            .await
            .unwrap();

        let image = store.put("photo..png", b"bytes").await.unwrap();
        assert!(!image.key.contains(".."));
        assert_eq!(store.list().await.unwrap(), vec![image.clone()]);

        store.remove(&image.key).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
