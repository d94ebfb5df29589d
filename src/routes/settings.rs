use actix_web::{web, HttpResponse};
use mongodb::Client;
use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, services::settings_service};

/*
    GET /api/settings
    Contact details and the booking notice period shown on the public site.
*/
pub async fn get_settings(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let settings = settings_service::load_settings(&data, &config).await?;
    Ok(HttpResponse::Ok().json(settings))
}
