//! File storage for post images.

use std::path::PathBuf;

use crate::config::StorageSettings;
use crate::{AppError, AppResult};

/// Stored file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (relative path).
    pub key: String,
    /// File size in bytes.
    pub size: u64,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file. Missing files are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a backend from configuration.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.base_path.clone(), settings.base_url.clone())
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(AppError::Storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), content_type = %content_type, "Stored file");

        Ok(UploadedFile {
            key: key.to_string(),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}

/// Generate a unique storage key for a post image.
#[must_use]
pub fn generate_storage_key(user_id: &str, original_name: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();
    let timestamp = now.timestamp_millis();

    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    format!(
        "posts/{date_path}/{user_id}/{timestamp}_{}.{extension}",
        uuid::Uuid::new_v4().simple()
    )
}
