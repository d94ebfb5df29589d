use actix_web::{web, HttpResponse};
use chrono::Utc;
use mongodb::Client;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        settings::{SettingsInput, SiteSettings, SETTINGS_DOCUMENT_ID},
    },
    services::{
        audit_service, settings_service,
        validation::{is_valid_email, is_valid_phone, require_text},
    },
};

const MAX_NOTICE_HOURS: u32 = 24 * 30;

pub fn validate_settings(input: &SettingsInput) -> AppResult<()> {
    require_text("Site name", &input.site_name)?;
    if !is_valid_email(input.contact_email.trim()) {
        return Err(AppError::Validation("Invalid contact email".to_string()));
    }
    if !input.contact_phone.trim().is_empty() && !is_valid_phone(&input.contact_phone) {
        return Err(AppError::Validation("Invalid contact phone".to_string()));
    }
    if let Some(whatsapp) = input.whatsapp_number.as_deref().filter(|w| !w.trim().is_empty()) {
        if !is_valid_phone(whatsapp) {
            return Err(AppError::Validation("Invalid WhatsApp number".to_string()));
        }
    }
    let currency = input.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "Currency must be a three-letter code".to_string(),
        ));
    }
    if input.min_booking_notice_hours > MAX_NOTICE_HOURS {
        return Err(AppError::Validation(format!(
            "Booking notice cannot exceed {} hours",
            MAX_NOTICE_HOURS
        )));
    }
    Ok(())
}

/*
    PUT /api/admin/settings
*/
pub async fn update_settings(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<SettingsInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_settings(&input)?;

    let settings = SiteSettings {
        id: SETTINGS_DOCUMENT_ID.to_string(),
        site_name: input.site_name.trim().to_string(),
        contact_email: input.contact_email.trim().to_lowercase(),
        contact_phone: input.contact_phone.trim().to_string(),
        whatsapp_number: input
            .whatsapp_number
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty()),
        address: input.address,
        currency: input.currency.trim().to_uppercase(),
        min_booking_notice_hours: input.min_booking_notice_hours,
        social: input.social,
        updated_at: Some(Utc::now()),
        updated_by: Some(user.email().to_string()),
    };
    settings_service::save_settings(&data, &config, &settings).await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "settings",
        Some(SETTINGS_DOCUMENT_ID.to_string()),
        "Updated site settings",
    )
    .await;

    Ok(HttpResponse::Ok().json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::SocialLinks;

    fn input() -> SettingsInput {
        SettingsInput {
            site_name: "Umrah Transport".to_string(),
            contact_email: "bookings@example.com".to_string(),
            contact_phone: "+966 50 123 4567".to_string(),
            whatsapp_number: Some("+966501234567".to_string()),
            address: None,
            currency: "sar".to_string(),
            min_booking_notice_hours: 12,
            social: SocialLinks::default(),
        }
    }

    #[test]
    fn accepts_reasonable_settings() {
        assert!(validate_settings(&input()).is_ok());
    }

    #[test]
    fn rejects_bad_contact_details() {
        let bad_email = SettingsInput {
            contact_email: "bookings".to_string(),
            ..input()
        };
        assert!(validate_settings(&bad_email).is_err());

        let bad_currency = SettingsInput {
            currency: "RIYAL".to_string(),
            ..input()
        };
        assert!(validate_settings(&bad_currency).is_err());

        let long_notice = SettingsInput {
            min_booking_notice_hours: MAX_NOTICE_HOURS + 1,
            ..input()
        };
        assert!(validate_settings(&long_notice).is_err());
    }
}
