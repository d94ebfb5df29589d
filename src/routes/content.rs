use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, CONTENT},
    error::{AppError, AppResult},
    models::content::ContentSection,
};

/*
    GET /api/content
*/
pub async fn list_published(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let sections: Vec<ContentSection> = mongo::collection::<ContentSection>(&data, &config, CONTENT)
        .find(doc! { "published": true })
        .sort(doc! { "sort_order": 1, "key": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(sections))
}

/*
    GET /api/content/{key}
*/
pub async fn get_section(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let section = mongo::collection::<ContentSection>(&data, &config, CONTENT)
        .find_one(doc! { "key": &key, "published": true })
        .await?
        .ok_or_else(|| AppError::not_found("Content section"))?;

    Ok(HttpResponse::Ok().json(section))
}
