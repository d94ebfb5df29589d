use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Route {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub slug: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<u32>,
    /// Default fare for any vehicle on this route, unless the pricing matrix overrides it.
    pub base_rate: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stops: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Route {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteInput {
    #[serde(default)]
    pub slug: Option<String>,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<u32>,
    pub base_rate: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub stops: Vec<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}
