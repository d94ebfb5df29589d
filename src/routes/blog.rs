use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, BLOG},
    error::{AppError, AppResult},
    models::{
        blog::{BlogPost, BlogQuery},
        paging, Page,
    },
};

/*
    GET /api/blog?tag=..&page=..&limit=..
*/
pub async fn list_published(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<BlogQuery>,
) -> AppResult<HttpResponse> {
    let (page, limit, skip) = paging(params.page, params.limit);

    let mut filter = doc! { "published": true };
    if let Some(tag) = params.tag_filter() {
        filter.insert("tags", tag);
    }

    let collection = mongo::collection::<BlogPost>(&data, &config, BLOG);
    let total = collection.count_documents(filter.clone()).await?;
    let items: Vec<BlogPost> = collection
        .find(filter)
        .sort(doc! { "published_at": -1 })
        .skip(skip)
        .limit(limit as i64)
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(Page {
        items,
        page,
        limit,
        total,
    }))
}

/*
    GET /api/blog/{slug}
*/
pub async fn get_by_slug(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = mongo::collection::<BlogPost>(&data, &config, BLOG)
        .find_one(doc! { "slug": &slug, "published": true })
        .await?
        .ok_or_else(|| AppError::not_found("Post"))?;

    Ok(HttpResponse::Ok().json(post))
}
