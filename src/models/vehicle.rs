use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Sedan,
    Suv,
    Van,
    Minibus,
    Bus,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Vehicle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: VehicleCategory,
    pub passenger_capacity: u32,
    pub luggage_capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
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

impl Vehicle {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleInput {
    pub name: String,
    pub category: VehicleCategory,
    pub passenger_capacity: u32,
    pub luggage_capacity: u32,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}
