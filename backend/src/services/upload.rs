//! Image upload storage
//!
//! Files are written under `<public_dir>/uploads` with a random name and
//! served back by the static file layer at `/uploads/<name>`.

use std::path::PathBuf;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Public URL prefix of stored uploads
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_bytes: usize,
}

/// File extension for an accepted image content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

impl UploadService {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.upload_dir(),
            max_bytes: config.server.max_upload_bytes,
        }
    }

    /// Store an image and return its public URL
    pub async fn save_image(&self, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        shared::validate_image_upload(content_type, bytes.len(), self.max_bytes)?;

        let extension = extension_for(content_type)
            .ok_or_else(|| AppError::BadRequest("Unsupported image type".to_string()))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot create upload dir: {}", e)))?;
        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot write upload: {}", e)))?;

        tracing::info!(file = %file_name, size = bytes.len(), "Image uploaded");
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, file_name))
    }
}
