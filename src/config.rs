use std::{env, fmt::Display, str::FromStr};

use chrono::{FixedOffset, Offset, Utc};
use log::{info, warn};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE: &str = "UmrahTransport";
const DEV_JWT_SECRET: &str = "dev_secret_change_me";
const CLOUD_STORAGE_URL: &str = "https://storage.googleapis.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Re-read the account behind a token on every back-office request.
    pub verify_accounts: bool,
    /// Offset of the business timezone from UTC. Saudi Arabia observes no DST.
    pub utc_offset_hours: i32,
    pub currency: String,
    pub gallery_bucket: Option<String>,
    pub cloud_storage_url: String,
    pub cors_allowed_origin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_uri = env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: try_load("PORT", PORT),
            mongo_uri,
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| DATABASE.to_string()),
            jwt_secret,
            jwt_ttl_hours: try_load("JWT_TTL_HOURS", 24),
            verify_accounts: try_load("VERIFY_ACCOUNTS", true),
            utc_offset_hours: try_load("BUSINESS_UTC_OFFSET_HOURS", 3),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "SAR".to_string()),
            gallery_bucket: optional("GALLERY_BUCKET"),
            cloud_storage_url: env::var("CLOUD_STORAGE_URL")
                .unwrap_or_else(|_| CLOUD_STORAGE_URL.to_string()),
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
        })
    }

    /// Configuration for tests and local tooling. Nothing here is read from the environment.
    pub fn for_tests() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: format!("{}Test", DATABASE),
            jwt_secret: "test_secret".to_string(),
            jwt_ttl_hours: 1,
            verify_accounts: false,
            utc_offset_hours: 3,
            currency: "SAR".to_string(),
            gallery_bucket: None,
            cloud_storage_url: CLOUD_STORAGE_URL.to_string(),
            cors_allowed_origin: None,
        }
    }

    pub fn business_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| {
            warn!("UTC offset {}h out of range, using UTC", self.utc_offset_hours);
            Utc.fix()
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn invalid_port_falls_back_to_default() {
        env::set_var("PORT", "not-a-port");
        assert_eq!(try_load("PORT", PORT), PORT);
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn missing_mongo_uri_is_an_error() {
        env::remove_var("MONGODB_URI");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing("MONGODB_URI"))
        ));
    }

    #[test]
    fn business_offset_is_riyadh_time() {
        let config = AppConfig::for_tests();
        assert_eq!(config.business_offset().local_minus_utc(), 3 * 3600);
    }
}
