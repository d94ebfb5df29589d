use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, REVIEWS},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        audit::AuditAction,
        paging,
        review::{ModerationInput, Review, ReviewStatus},
        Page,
    },
    services::audit_service,
};

#[derive(Debug, Deserialize)]
pub struct ModerationQuery {
    pub status: Option<ReviewStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/*
    GET /api/admin/reviews?status=pending
*/
pub async fn list_reviews(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<ModerationQuery>,
) -> AppResult<HttpResponse> {
    let (page, limit, skip) = paging(params.page, params.limit);
    let filter = match params.status {
        Some(status) => doc! { "status": status.as_str() },
        None => doc! {},
    };

    let collection = mongo::collection::<Review>(&data, &config, REVIEWS);
    let total = collection.count_documents(filter.clone()).await?;
    let items: Vec<Review> = collection
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
    PUT /api/admin/reviews/{id}/moderate
*/
pub async fn moderate(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<ModerationInput>,
) -> AppResult<HttpResponse> {
    if input.status == ReviewStatus::Pending {
        return Err(AppError::Validation(
            "A review can only be approved or rejected".to_string(),
        ));
    }
    let oid = parse_object_id(&path.into_inner())?;

    let collection = mongo::collection::<Review>(&data, &config, REVIEWS);
    let mut review = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;

    review.status = input.status;
    review.moderated_by = Some(user.email().to_string());
    review.updated_at = Some(Utc::now());
    collection.replace_one(doc! { "_id": oid }, &review).await?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Moderate,
        "review",
        Some(oid.to_hex()),
        format!("Review by {} {}", review.name, review.status.as_str()),
    )
    .await;

    Ok(HttpResponse::Ok().json(review))
}

/*
    DELETE /api/admin/reviews/{id}
*/
pub async fn delete_review(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let oid = parse_object_id(&path.into_inner())?;
    let review = mongo::collection::<Review>(&data, &config, REVIEWS)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "review",
        Some(oid.to_hex()),
        format!("Deleted review by {}", review.name),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}
