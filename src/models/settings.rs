use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SETTINGS_DOCUMENT_ID: &str = "site";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SiteSettings {
    #[serde(rename = "_id")]
    pub id: String,
    pub site_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub whatsapp_number: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    /// Earliest pickup a customer may request, measured from now.
    pub min_booking_notice_hours: u32,
    #[serde(default)]
    pub social: SocialLinks,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            id: SETTINGS_DOCUMENT_ID.to_string(),
            site_name: "Umrah Transport".to_string(),
            contact_email: "info@example.com".to_string(),
            contact_phone: String::new(),
            whatsapp_number: None,
            address: None,
            currency: "SAR".to_string(),
            min_booking_notice_hours: 12,
            social: SocialLinks::default(),
            updated_at: None,
            updated_by: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SettingsInput {
    pub site_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub whatsapp_number: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub min_booking_notice_hours: u32,
    #[serde(default)]
    pub social: SocialLinks,
}
