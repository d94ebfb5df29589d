use mongodb::{bson::doc, Client};

use crate::{
    config::AppConfig,
    db::mongo::{self, SETTINGS},
    error::AppResult,
    models::settings::{SiteSettings, SETTINGS_DOCUMENT_ID},
};

/// Stored settings, or defaults seeded with the configured currency when none were saved yet.
pub async fn load_settings(client: &Client, config: &AppConfig) -> AppResult<SiteSettings> {
    let stored = mongo::collection::<SiteSettings>(client, config, SETTINGS)
        .find_one(doc! { "_id": SETTINGS_DOCUMENT_ID })
        .await?;

    Ok(stored.unwrap_or_else(|| SiteSettings {
        currency: config.currency.clone(),
        ..SiteSettings::default()
    }))
}

pub async fn save_settings(
    client: &Client,
    config: &AppConfig,
    settings: &SiteSettings,
) -> AppResult<()> {
    mongo::collection::<SiteSettings>(client, config, SETTINGS)
        .replace_one(doc! { "_id": SETTINGS_DOCUMENT_ID }, settings)
        .upsert(true)
        .await?;
    Ok(())
}
