use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A named block of page copy, e.g. `hero`, `about`, `why-choose-us`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentSection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub key: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Rich-text HTML produced by the back-office editor.
    pub body: String,
    pub image_url: Option<String>,
    pub published: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub updated_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ContentInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub sort_order: Option<i32>,
}
