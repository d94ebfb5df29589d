use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, CONTENT},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        content::{ContentInput, ContentSection},
    },
    services::{
        audit_service,
        validation::{is_valid_slug, require_text},
    },
};

fn validate_key(key: &str) -> AppResult<()> {
    if is_valid_slug(key) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Section key '{}' may only contain lowercase letters, digits and dashes",
            key
        )))
    }
}

/*
    GET /api/admin/content
    Drafts included.
*/
pub async fn list_all(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let sections: Vec<ContentSection> = mongo::collection::<ContentSection>(&data, &config, CONTENT)
        .find(doc! {})
        .sort(doc! { "sort_order": 1, "key": 1 })
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(sections))
}

/*
    PUT /api/admin/content/{key}
*/
pub async fn upsert_section(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<ContentInput>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    validate_key(&key)?;
    let input = input.into_inner();
    require_text("Title", &input.title)?;

    let collection = mongo::collection::<ContentSection>(&data, &config, CONTENT);
    let existing = collection.find_one(doc! { "key": &key }).await?;

    let now = Utc::now();
    let section = ContentSection {
        id: existing.as_ref().and_then(|s| s.id),
        key: key.clone(),
        title: input.title.trim().to_string(),
        subtitle: input.subtitle,
        body: input.body,
        image_url: input.image_url,
        published: input.published,
        sort_order: input
            .sort_order
            .or_else(|| existing.as_ref().map(|s| s.sort_order))
            .unwrap_or(0),
        updated_by: Some(user.email().to_string()),
        created_at: existing.as_ref().and_then(|s| s.created_at).or(Some(now)),
        updated_at: Some(now),
    };

    collection
        .replace_one(doc! { "key": &key }, &section)
        .upsert(true)
        .await?;

    let action = if existing.is_some() {
        AuditAction::Update
    } else {
        AuditAction::Create
    };
    audit_service::record(
        &data,
        &config,
        user.claims(),
        action,
        "content",
        Some(key.clone()),
        format!("Saved section {}", key),
    )
    .await;

    Ok(HttpResponse::Ok().json(section))
}

/*
    DELETE /api/admin/content/{key}
*/
pub async fn delete_section(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let result = mongo::collection::<ContentSection>(&data, &config, CONTENT)
        .delete_one(doc! { "key": &key })
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::not_found("Content section"));
    }

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "content",
        Some(key.clone()),
        format!("Deleted section {}", key),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
