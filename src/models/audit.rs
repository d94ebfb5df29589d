use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Moderate,
    SignIn,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub actor_id: Option<String>,
    pub actor_email: String,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<String>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub entity: Option<String>,
    pub actor: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
