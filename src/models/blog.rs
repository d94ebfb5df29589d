use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogPost {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct BlogPostInput {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub body: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    pub tag: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Tags are stored trimmed and lowercase.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

impl BlogQuery {
    pub fn tag_filter(&self) -> Option<String> {
        self.tag.as_deref().and_then(normalize_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_tag_matches_stored_form() {
        let query = BlogQuery {
            tag: Some("  Umrah ".to_string()),
            page: None,
            limit: None,
        };
        assert_eq!(query.tag_filter().as_deref(), Some("umrah"));

        let blank = BlogQuery {
            tag: Some(" ".to_string()),
            page: None,
            limit: None,
        };
        assert_eq!(blank.tag_filter(), None);
    }
}
