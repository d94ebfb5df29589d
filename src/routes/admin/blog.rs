use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, BLOG},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        blog::{normalize_tag, BlogPost, BlogPostInput, BlogQuery},
        paging, Page,
    },
    services::{
        audit_service,
        validation::{require_text, resolve_slug},
    },
};

/// `published_at` is stamped the first time a post goes live and kept afterwards.
pub fn publication_date(
    previous: Option<DateTime<Utc>>,
    published: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match previous {
        Some(at) => Some(at),
        None if published => Some(now),
        None => None,
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags.iter().filter_map(|t| normalize_tag(t)).collect();
    tags.sort();
    tags.dedup();
    tags
}

fn slug_conflict(err: AppError, slug: &str) -> AppError {
    if err.is_duplicate_key() {
        AppError::Conflict(format!("A post with slug '{}' already exists", slug))
    } else {
        err
    }
}

/*
    GET /api/admin/blog
*/
pub async fn list_all(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<BlogQuery>,
) -> AppResult<HttpResponse> {
    let (page, limit, skip) = paging(params.page, params.limit);
    let mut filter = doc! {};
    if let Some(tag) = params.tag_filter() {
        filter.insert("tags", tag);
    }

    let collection = mongo::collection::<BlogPost>(&data, &config, BLOG);
    let total = collection.count_documents(filter.clone()).await?;
    let items: Vec<BlogPost> = collection
        .find(filter)
        .sort(doc! { "_id": -1 })
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
    POST /api/admin/blog
*/
pub async fn create_post(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<BlogPostInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    require_text("Title", &input.title)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;

    let now = Utc::now();
    let mut post = BlogPost {
        id: None,
        slug,
        title: input.title.trim().to_string(),
        excerpt: input.excerpt.trim().to_string(),
        body: input.body,
        cover_image: input.cover_image,
        tags: clean_tags(input.tags),
        author: user.email().to_string(),
        published: input.published,
        published_at: publication_date(None, input.published, now),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = mongo::collection::<BlogPost>(&data, &config, BLOG)
        .insert_one(&post)
        .await
        .map_err(|e| slug_conflict(e.into(), &post.slug))?;
    post.id = result.inserted_id.as_object_id();

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Create,
        "blog",
        post.id.map(|id| id.to_hex()),
        format!("Created post '{}'", post.title),
    )
    .await;

    Ok(HttpResponse::Created().json(post))
}

/*
    PUT /api/admin/blog/{id}
*/
pub async fn update_post(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<BlogPostInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    require_text("Title", &input.title)?;
    let oid = parse_object_id(&path.into_inner())?;

    let collection = mongo::collection::<BlogPost>(&data, &config, BLOG);
    let existing = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Post"))?;

    let slug = match input.slug.as_deref() {
        Some(_) => resolve_slug(input.slug.as_deref(), &input.title)?,
        None => existing.slug.clone(),
    };
    let now = Utc::now();
    let post = BlogPost {
        slug,
        title: input.title.trim().to_string(),
        excerpt: input.excerpt.trim().to_string(),
        body: input.body,
        cover_image: input.cover_image,
        tags: clean_tags(input.tags),
        published: input.published,
        published_at: publication_date(existing.published_at, input.published, now),
        updated_at: Some(now),
        ..existing
    };

    collection
        .replace_one(doc! { "_id": oid }, &post)
        .await
        .map_err(|e| slug_conflict(e.into(), &post.slug))?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "blog",
        Some(oid.to_hex()),
        format!("Updated post '{}'", post.title),
    )
    .await;

    Ok(HttpResponse::Ok().json(post))
}

/*
    DELETE /api/admin/blog/{id}
*/
pub async fn delete_post(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let oid = parse_object_id(&path.into_inner())?;
    let post = mongo::collection::<BlogPost>(&data, &config, BLOG)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Post"))?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "blog",
        Some(oid.to_hex()),
        format!("Deleted post '{}'", post.title),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn first_publish_sets_the_date_once() {
        let first = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();

        assert_eq!(publication_date(None, false, first), None);
        assert_eq!(publication_date(None, true, first), Some(first));
        assert_eq!(publication_date(Some(first), true, later), Some(first));
        // Unpublishing keeps the original date for a later re-publish.
        assert_eq!(publication_date(Some(first), false, later), Some(first));
    }

    #[test]
    fn tags_are_normalised() {
        let tags = clean_tags(vec![
            "Umrah".to_string(),
            " umrah ".to_string(),
            "Ziyarat".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tags, vec!["umrah".to_string(), "ziyarat".to_string()]);
    }
}
