use base64::{engine::general_purpose, Engine as _};
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;

const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageData {
    pub data: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
}

#[derive(Debug, Error)]
pub enum ImageUploadError {
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
    #[error("GCS upload error: {0}")]
    Gcs(String),
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("Image upload is not configured: {0}")]
    NotConfigured(String),
}

impl From<ImageUploadError> for AppError {
    fn from(err: ImageUploadError) -> Self {
        match err {
            ImageUploadError::Base64Decode(_) | ImageUploadError::InvalidImageFormat(_) => {
                AppError::Validation(err.to_string())
            }
            ImageUploadError::Gcs(_) | ImageUploadError::NotConfigured(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

pub struct ImageService {
    client: Client,
    bucket_name: String,
    public_base_url: String,
}

impl ImageService {
    pub async fn new(config: &AppConfig) -> Result<Self, ImageUploadError> {
        let bucket_name = config
            .gallery_bucket
            .clone()
            .ok_or_else(|| ImageUploadError::NotConfigured("GALLERY_BUCKET not set".to_string()))?;

        let client_config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| ImageUploadError::Gcs(format!("Failed to create GCS client: {}", e)))?;

        Ok(Self {
            client: Client::new(client_config),
            bucket_name,
            public_base_url: config.cloud_storage_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn upload(&self, image: ImageData, folder: &str) -> Result<String, ImageUploadError> {
        let (bytes, extension) = decode_image(&image)?;

        let object_name = format!(
            "{}/{}-{}.{}",
            folder,
            chrono::Utc::now().timestamp(),
            Uuid::new_v4(),
            extension
        );

        let upload_type = UploadType::Simple(Media::new(object_name.clone()));
        let upload_request = UploadObjectRequest {
            bucket: self.bucket_name.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&upload_request, bytes, &upload_type)
            .await
            .map_err(|e| ImageUploadError::Gcs(format!("Failed to upload to GCS: {}", e)))?;

        info!("Uploaded {} to bucket {}", object_name, self.bucket_name);
        Ok(format!(
            "{}/{}/{}",
            self.public_base_url, self.bucket_name, object_name
        ))
    }

    /// Removes an object previously returned by `upload`. URLs hosted elsewhere are left alone.
    pub async fn delete_by_url(&self, url: &str) {
        let prefix = format!("{}/{}/", self.public_base_url, self.bucket_name);
        let Some(object) = url.strip_prefix(&prefix) else {
            return;
        };

        let request = DeleteObjectRequest {
            bucket: self.bucket_name.clone(),
            object: object.to_string(),
            ..Default::default()
        };
        if let Err(e) = self.client.delete_object(&request).await {
            warn!("Failed to delete {} from bucket {}: {}", object, self.bucket_name, e);
        }
    }
}

pub fn decode_image(image: &ImageData) -> Result<(Vec<u8>, &'static str), ImageUploadError> {
    let extension = file_extension(&image.file_type)?;

    let base64_data = if image.data.starts_with("data:") {
        image.data.split(',').nth(1).ok_or_else(|| {
            ImageUploadError::InvalidImageFormat("Invalid base64 data format".to_string())
        })?
    } else {
        &image.data
    };

    let bytes = general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| ImageUploadError::Base64Decode(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ImageUploadError::InvalidImageFormat("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageUploadError::InvalidImageFormat(format!(
            "Image exceeds {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok((bytes, extension))
}

fn file_extension(file_type: &str) -> Result<&'static str, ImageUploadError> {
    match file_type {
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        _ => Err(ImageUploadError::InvalidImageFormat(format!(
            "Unsupported file type: {}",
            file_type
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(data: &str, file_type: &str) -> ImageData {
        ImageData {
            data: data.to_string(),
            file_name: "kaaba.png".to_string(),
            file_type: file_type.to_string(),
        }
    }

    #[test]
    fn decodes_data_url() {
        let encoded = general_purpose::STANDARD.encode(b"fake-png-bytes");
        let data_url = format!("data:image/png;base64,{}", encoded);
        let (bytes, ext) = decode_image(&image(&data_url, "image/png")).unwrap();
        assert_eq!(bytes, b"fake-png-bytes");
        assert_eq!(ext, "png");
    }

    #[test]
    fn rejects_unknown_types_and_bad_base64() {
        assert!(matches!(
            decode_image(&image("AAAA", "application/pdf")),
            Err(ImageUploadError::InvalidImageFormat(_))
        ));
        assert!(matches!(
            decode_image(&image("not base64!!", "image/jpeg")),
            Err(ImageUploadError::Base64Decode(_))
        ));
    }

    #[test]
    fn upload_errors_map_to_app_errors() {
        let err: AppError = ImageUploadError::InvalidImageFormat("x".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = ImageUploadError::NotConfigured("x".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
