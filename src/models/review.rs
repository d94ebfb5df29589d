use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub country: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub route_id: Option<ObjectId>,
    pub status: ReviewStatus,
    pub moderated_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub name: String,
    pub country: Option<String>,
    pub rating: u8,
    pub comment: String,
    pub route_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModerationInput {
    pub status: ReviewStatus,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReviewSummary {
    pub count: u64,
    pub average: f64,
}

impl ReviewSummary {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return ReviewSummary {
                count: 0,
                average: 0.0,
            };
        }
        let total: u32 = ratings.iter().map(|r| *r as u32).sum();
        let average = total as f64 / ratings.len() as f64;
        ReviewSummary {
            count: ratings.len() as u64,
            average: (average * 10.0).round() / 10.0,
        }
    }
}
