use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::warn;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, GALLERY},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        gallery::{GalleryInput, GalleryItem, GalleryUpdateInput},
    },
    services::{audit_service, image_service::ImageService},
};

const GALLERY_FOLDER: &str = "gallery";

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Omitted fields keep their value; an empty caption or category clears it.
fn apply_update(existing: GalleryItem, input: GalleryUpdateInput) -> GalleryItem {
    let replace = |new: Option<String>, old: Option<String>| match new {
        Some(value) => trimmed(Some(value)),
        None => old,
    };
    GalleryItem {
        caption: replace(input.caption, existing.caption),
        category: replace(input.category, existing.category),
        sort_order: input.sort_order.unwrap_or(existing.sort_order),
        updated_at: Some(Utc::now()),
        ..existing
    }
}

/*
    POST /api/admin/gallery
    Accepts either `image_url` or an inline base64 `image`, which is uploaded to the bucket.
*/
pub async fn create_item(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<GalleryInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();

    let image_url = match (input.image, trimmed(input.image_url)) {
        (Some(image), _) => {
            let service = ImageService::new(&config).await?;
            service.upload(image, GALLERY_FOLDER).await?
        }
        (None, Some(url)) => url,
        (None, None) => {
            return Err(AppError::Validation(
                "Provide an image or an image URL".to_string(),
            ))
        }
    };

    let now = Utc::now();
    let mut item = GalleryItem {
        id: None,
        image_url,
        caption: trimmed(input.caption),
        category: trimmed(input.category),
        sort_order: input.sort_order.unwrap_or(0),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = mongo::collection::<GalleryItem>(&data, &config, GALLERY)
        .insert_one(&item)
        .await?;
    item.id = result.inserted_id.as_object_id();

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Create,
        "gallery",
        item.id.map(|id| id.to_hex()),
        format!("Added gallery image {}", item.image_url),
    )
    .await;

    Ok(HttpResponse::Created().json(item))
}

/*
    PUT /api/admin/gallery/{id}
*/
pub async fn update_item(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<GalleryUpdateInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let oid = parse_object_id(&path.into_inner())?;

    let collection = mongo::collection::<GalleryItem>(&data, &config, GALLERY);
    let existing = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Gallery item"))?;

    let item = apply_update(existing, input);
    collection.replace_one(doc! { "_id": oid }, &item).await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "gallery",
        Some(oid.to_hex()),
        "Updated gallery item",
    )
    .await;

    Ok(HttpResponse::Ok().json(item))
}

/*
    DELETE /api/admin/gallery/{id}
*/
pub async fn delete_item(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let oid = parse_object_id(&path.into_inner())?;
    let item = mongo::collection::<GalleryItem>(&data, &config, GALLERY)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Gallery item"))?;

    // The record is gone either way; a stale object in the bucket is only logged.
    match ImageService::new(&config).await {
        Ok(service) => service.delete_by_url(&item.image_url).await,
        Err(e) => warn!("Skipping storage cleanup for {}: {}", item.image_url, e),
    }

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "gallery",
        Some(oid.to_hex()),
        format!("Removed gallery image {}", item.image_url),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> GalleryItem {
        GalleryItem {
            id: None,
            image_url: "https://storage.googleapis.com/site/gallery/haram.jpg".to_string(),
            caption: Some("Masjid al-Haram".to_string()),
            category: Some("makkah".to_string()),
            sort_order: 3,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn omitted_fields_are_kept() {
        let updated = apply_update(
            item(),
            GalleryUpdateInput {
                caption: None,
                category: None,
                sort_order: None,
            },
        );
        assert_eq!(updated.caption.as_deref(), Some("Masjid al-Haram"));
        assert_eq!(updated.category.as_deref(), Some("makkah"));
        assert_eq!(updated.sort_order, 3);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn empty_strings_clear_and_values_replace() {
        let updated = apply_update(
            item(),
            GalleryUpdateInput {
                caption: Some("  ".to_string()),
                category: Some(" madinah ".to_string()),
                sort_order: Some(1),
            },
        );
        assert_eq!(updated.caption, None);
        assert_eq!(updated.category.as_deref(), Some("madinah"));
        assert_eq!(updated.sort_order, 1);
    }
}
