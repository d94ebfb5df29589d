use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, GALLERY},
    error::AppResult,
    models::gallery::{GalleryItem, GalleryQuery},
};

/*
    GET /api/gallery?category=..
*/
pub async fn list_items(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<GalleryQuery>,
) -> AppResult<HttpResponse> {
    let filter = match params.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => doc! { "category": category },
        None => doc! {},
    };

    let items: Vec<GalleryItem> = mongo::collection::<GalleryItem>(&data, &config, GALLERY)
        .find(filter)
        .sort(doc! { "sort_order": 1, "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(items))
}
