//! Post image uploads.

use std::io::Cursor;
use std::sync::Arc;

use image::ImageReader;
use yatube_common::{AppResult, FormErrors, StorageBackend, generate_storage_key};

/// A file received from a form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as sent by the browser.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// What the decoder found in an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: image::ImageFormat,
    pub width: u32,
    pub height: u32,
}

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Accept only files that declare an image type and actually decode as one.
pub fn validate_image(upload: &ImageUpload, max_bytes: usize) -> Result<ImageInfo, FormErrors> {
    if upload.data.is_empty() {
        return Err(FormErrors::single("image", "The submitted file is empty."));
    }
    if upload.data.len() > max_bytes {
        return Err(FormErrors::single(
            "image",
            format!("The file is too large. Maximum size is {max_bytes} bytes."),
        ));
    }
    if !upload.content_type.starts_with("image/") {
        return Err(FormErrors::single("image", INVALID_IMAGE));
    }

    let reader = ImageReader::new(Cursor::new(&upload.data))
        .with_guessed_format()
        .map_err(|_| FormErrors::single("image", INVALID_IMAGE))?;
    let format = reader
        .format()
        .ok_or_else(|| FormErrors::single("image", INVALID_IMAGE))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|_| FormErrors::single("image", INVALID_IMAGE))?;

    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

/// Validates and stores post images.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn StorageBackend>,
    max_upload_bytes: usize,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            max_upload_bytes,
        }
    }

    /// Check an upload without storing it.
    pub fn validate(&self, upload: &ImageUpload) -> Result<ImageInfo, FormErrors> {
        validate_image(upload, self.max_upload_bytes)
    }

    /// Store an already validated upload. Returns its storage key.
    pub async fn store(&self, user_id: &str, upload: &ImageUpload) -> AppResult<String> {
        let key = generate_storage_key(user_id, &upload.file_name);
        let stored = self
            .storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;
        tracing::debug!(key = %stored.key, size = stored.size, "Stored post image");
        Ok(stored.key)
    }

    /// Remove a stored image, logging instead of failing.
    pub async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete post image");
        }
    }

    /// Public URL of a stored image.
    #[must_use]
    pub fn url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }
}
