use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, REVIEWS},
    error::{AppError, AppResult},
    models::review::{Review, ReviewInput, ReviewStatus, ReviewSummary},
    services::validation::require_text,
};

const MAX_COMMENT_CHARS: usize = 2000;

#[derive(serde::Deserialize, serde::Serialize)]
struct RatingOnly {
    rating: u8,
}

#[derive(serde::Deserialize)]
pub struct ReviewQuery {
    limit: Option<u16>,
}

pub fn validate_review(input: &ReviewInput) -> AppResult<()> {
    require_text("Name", &input.name)?;
    require_text("Comment", &input.comment)?;
    if !(1..=5).contains(&input.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if input.comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(())
}

/*
    GET /api/reviews
*/
pub async fn list_approved(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<ReviewQuery>,
) -> AppResult<HttpResponse> {
    let collection = mongo::collection::<Review>(&data, &config, REVIEWS);
    let mut find = collection
        .find(doc! { "status": ReviewStatus::Approved.as_str() })
        .sort(doc! { "created_at": -1 });
    if let Some(limit) = params.limit {
        find = find.limit(limit.into());
    }

    let reviews: Vec<Review> = find.await?.try_collect().await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/*
    GET /api/reviews/summary
*/
pub async fn summary(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let ratings: Vec<RatingOnly> = mongo::collection::<RatingOnly>(&data, &config, REVIEWS)
        .find(doc! { "status": ReviewStatus::Approved.as_str() })
        .projection(doc! { "_id": 0, "rating": 1 })
        .await?
        .try_collect()
        .await?;

    let ratings: Vec<u8> = ratings.iter().map(|r| r.rating).collect();
    Ok(HttpResponse::Ok().json(ReviewSummary::from_ratings(&ratings)))
}

/*
    POST /api/reviews
    New reviews wait for moderation before they show up.
*/
pub async fn submit(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<ReviewInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    validate_review(&input)?;

    let route_id = match input.route_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => Some(ObjectId::parse_str(id).map_err(|_| AppError::invalid_id(id))?),
        None => None,
    };

    let now = Utc::now();
    let review = Review {
        id: None,
        name: input.name.trim().to_string(),
        country: input.country,
        rating: input.rating,
        comment: input.comment.trim().to_string(),
        route_id,
        status: ReviewStatus::Pending,
        moderated_by: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    mongo::collection::<Review>(&data, &config, REVIEWS)
        .insert_one(&review)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": "pending",
        "message": "Thank you! Your review will appear once approved."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rating: u8, comment: &str) -> ReviewInput {
        ReviewInput {
            name: "Fatima".to_string(),
            country: Some("Malaysia".to_string()),
            rating,
            comment: comment.to_string(),
            route_id: None,
        }
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert!(validate_review(&input(5, "Driver was on time")).is_ok());
        assert!(validate_review(&input(0, "x")).is_err());
        assert!(validate_review(&input(6, "x")).is_err());
    }

    #[test]
    fn comment_is_required_and_bounded() {
        assert!(validate_review(&input(4, "   ")).is_err());
        assert!(validate_review(&input(4, &"a".repeat(MAX_COMMENT_CHARS + 1))).is_err());
    }
}
