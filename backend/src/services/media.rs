//! Storage for report photos sent as base64 data URLs

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};

/// Decoded photo ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Content-addressed file name
    pub fn file_name(&self) -> String {
        format!("{:x}.{}", Sha256::digest(&self.bytes), self.extension)
    }
}

fn extension_for(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Decode `data:image/<type>;base64,<payload>`
pub fn decode_data_url(data_url: &str, max_bytes: usize) -> AppResult<DecodedImage> {
    let invalid = || AppError::field("image", "Format gambar tidak valid");

    let rest = data_url.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
    let extension = extension_for(mime).ok_or_else(invalid)?;

    // Base64 inflates by 4/3; reject early before decoding
    if payload.len() / 4 * 3 > max_bytes + 3 {
        return Err(AppError::ImageTooLarge(payload.len() / 4 * 3));
    }
    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.len() > max_bytes {
        return Err(AppError::ImageTooLarge(bytes.len()));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Writes photos under the media directory and returns their public URL
#[derive(Clone)]
pub struct MediaStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_image_bytes,
        }
    }

    pub async fn save_data_url(&self, data_url: &str) -> AppResult<String> {
        let image = decode_data_url(data_url, self.max_bytes)?;
        let name = image.file_name();

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot create media dir: {}", e)))?;
        tokio::fs::write(self.dir.join(&name), &image.bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Cannot write {}: {}", name, e)))?;

        tracing::debug!("Stored report image {} ({} bytes)", name, image.bytes.len());
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
