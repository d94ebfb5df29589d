use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{info, warn};
use mongodb::bson::{doc, Document};
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, USERS},
    error::{AppError, AppResult},
    middleware::{
        auth::{issue_token, Claims},
        auth_context::AuthenticatedUser,
    },
    models::{
        account::{SignInInput, User, UserProfile},
        audit::AuditAction,
    },
    services::audit_service,
};

/// Accounts are locked after this many consecutive failed sign-ins until an admin resets them.
pub const MAX_FAILED_SIGNINS: i32 = 10;

fn failed_signin_update() -> Document {
    doc! { "$inc": { "failed_signins": 1 } }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
    pub user: UserProfile,
}

/*
    POST /api/auth/signin
*/
pub async fn signin(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<SignInInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let collection = mongo::collection::<User>(&data, &config, USERS);
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = collection
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(invalid)?;

    if !user.active || user.failed_signins.unwrap_or(0) >= MAX_FAILED_SIGNINS {
        warn!("Sign-in refused for inactive or locked account {}", email);
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal("Stored user has no id".to_string()))?;

    if !bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
        // Atomic so parallel guesses each count toward the lockout.
        collection
            .update_one(doc! { "_id": user_id }, failed_signin_update())
            .await?;
        return Err(invalid());
    }

    let now = Utc::now();
    collection
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "last_signin": now.to_rfc3339(), "failed_signins": 0 } },
        )
        .await?;

    let token = issue_token(&config, &user.email, &user_id.to_hex(), user.role)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let profile = UserProfile::from(User {
        last_signin: Some(now),
        ..user
    });

    let actor = Claims {
        sub: profile.email.clone(),
        exp: 0,
        iat: 0,
        user_id: profile.id.clone(),
        role: profile.role,
    };
    audit_service::record(
        &data,
        &config,
        &actor,
        AuditAction::SignIn,
        "user",
        Some(profile.id.clone()),
        "Signed in",
    )
    .await;
    info!("{} signed in", profile.email);

    Ok(HttpResponse::Ok().json(TokenResponse {
        auth_token: token,
        user: profile,
    }))
}

/*
    GET /api/auth/session
*/
pub async fn session(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let user_id = ObjectId::parse_str(user.user_id())
        .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))?;

    let stored = mongo::collection::<User>(&data, &config, USERS)
        .find_one(doc! { "_id": user_id, "active": true })
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(stored)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_signins_are_incremented_in_place() {
        let update = failed_signin_update();
        assert!(update.get("$set").is_none());
        assert_eq!(update.get_document("$inc").unwrap().get_i32("failed_signins").unwrap(), 1);
    }
}
