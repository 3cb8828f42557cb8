use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use super::{ImageFile, ImageUploader, UploadError, UploadedImage};
use crate::config::UploadConfig;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Signed uploads to the Cloudinary image API
pub struct CloudinaryUploader {
    client: reqwest::Client,
    api_base: Url,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        folder: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: Url::parse(DEFAULT_API_BASE).expect("static Cloudinary URL is valid"),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: folder.into(),
        })
    }

    /// Build from config; `Ok(None)` when any credential is missing
    pub fn from_config(config: &UploadConfig) -> Result<Option<Self>, UploadError> {
        config
            .cloudinary_credentials()
            .map(|(name, key, secret)| {
                Self::new(
                    name,
                    key,
                    secret,
                    config.folder.clone(),
                    Duration::from_secs(config.timeout_seconds),
                )
            })
            .transpose()
    }

    /// Point the uploader at a different API host
    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }

    fn upload_url(&self) -> Result<Url, UploadError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| UploadError::Rejected("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v1_1", self.cloud_name.as_str(), "image", "upload"]);
        Ok(url)
    }

    /// SHA-256 over the alphabetically sorted signed params followed by the API secret
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload(&self, file: ImageFile) -> Result<UploadedImage, UploadError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let public_id = Uuid::new_v4().simple().to_string();
        let signature = self.sign(&[
            ("folder", self.folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("folder", self.folder.clone())
            .text("public_id", public_id)
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = self.upload_url()?;
        tracing::debug!("Uploading {} ({} bytes) to {}", file.file_name, file.data.len(), url);

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let body: UploadResponse = response.json().await?;

        match body {
            UploadResponse {
                secure_url: Some(secure_url),
                public_id: Some(public_id),
                ..
            } if status.is_success() => {
                tracing::info!("Uploaded image {}", public_id);
                Ok(UploadedImage { secure_url, public_id })
            }
            UploadResponse { error: Some(err), .. } => {
                tracing::warn!("Cloudinary rejected upload ({}): {}", status, err.message);
                Err(UploadError::Rejected(err.message))
            }
            _ => Err(UploadError::Rejected(format!("unexpected response status {}", status))),
        }
    }
}
