use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::services::image_service::ImageData;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub image_url: String,
    pub caption: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Either an already-hosted URL or an inline image to upload.
#[derive(Debug, Deserialize)]
pub struct GalleryInput {
    pub image_url: Option<String>,
    pub image: Option<ImageData>,
    pub caption: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryUpdateInput {
    pub caption: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub category: Option<String>,
}
