pub mod cloudinary;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cloudinary::CloudinaryUploader;

/// Image content types accepted for profile pictures
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/webp", "image/gif"];

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Where the image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image is empty")]
    Empty,

    #[error("Image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Image upload is not configured")]
    NotConfigured,

    #[error("Image host rejected upload: {0}")]
    Rejected(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: ImageFile) -> Result<UploadedImage, UploadError>;
}

impl ImageFile {
    /// Reject anything that is not a reasonably sized image before it leaves the process
    pub fn validate(&self, max_bytes: usize) -> Result<(), UploadError> {
        if self.data.is_empty() {
            return Err(UploadError::Empty);
        }
        if self.data.len() > max_bytes {
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        let content_type = self.content_type.to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(UploadError::UnsupportedType(self.content_type.clone()));
        }
        Ok(())
    }
}

/// Used when no image host credentials are configured
pub struct DisabledUploader;

#[async_trait]
impl ImageUploader for DisabledUploader {
    async fn upload(&self, _file: ImageFile) -> Result<UploadedImage, UploadError> {
        Err(UploadError::NotConfigured)
    }
}
