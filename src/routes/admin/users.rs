use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use log::info;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, parse_object_id, USERS},
    error::{AppError, AppResult},
    middleware::auth_context::AuthenticatedUser,
    models::{
        account::{CreateUserInput, UpdateUserInput, User, UserProfile},
        audit::AuditAction,
    },
    services::{
        audit_service,
        validation::{is_valid_email, require_text},
    },
};

const MIN_PASSWORD_CHARS: usize = 8;

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/*
    GET /api/admin/users
*/
pub async fn list_users(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let users: Vec<User> = mongo::collection::<User>(&data, &config, USERS)
        .find(doc! {})
        .sort(doc! { "email": 1 })
        .await?
        .try_collect()
        .await?;

    let profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::from).collect();
    Ok(HttpResponse::Ok().json(profiles))
}

/*
    POST /api/admin/users
*/
pub async fn create_user(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    input: web::Json<CreateUserInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();
    require_text("Name", &input.name)?;
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    validate_password(&input.password)?;

    let now = Utc::now();
    let new_user = User {
        id: None,
        email,
        password: hash_password(&input.password)?,
        name: input.name.trim().to_string(),
        role: input.role,
        active: true,
        last_signin: None,
        failed_signins: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = mongo::collection::<User>(&data, &config, USERS)
        .insert_one(&new_user)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.is_duplicate_key() {
                AppError::Conflict("A user with this email already exists".to_string())
            } else {
                err
            }
        })?;

    let profile = UserProfile::from(User {
        id: result.inserted_id.as_object_id(),
        ..new_user
    });

    info!("{} created {} user {}", user.email(), profile.role.as_str(), profile.email);
    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Create,
        "user",
        Some(profile.id.clone()),
        format!("Created {} {}", profile.role.as_str(), profile.email),
    )
    .await;

    Ok(HttpResponse::Created().json(profile))
}

/*
    PUT /api/admin/users/{id}
    Re-activating an account also clears its failed sign-in lockout.
*/
pub async fn update_user(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<UpdateUserInput>,
) -> AppResult<HttpResponse> {
    let input = input.into_inner();
    let id = path.into_inner();
    let oid = parse_object_id(&id)?;

    let is_self = id.trim() == user.user_id();
    if is_self && (input.active == Some(false) || input.role.is_some_and(|r| r != user.claims().role)) {
        return Err(AppError::Forbidden(
            "You cannot deactivate or demote your own account".to_string(),
        ));
    }

    let collection = mongo::collection::<User>(&data, &config, USERS);
    let mut stored = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if let Some(name) = input.name {
        require_text("Name", &name)?;
        stored.name = name.trim().to_string();
    }
    if let Some(role) = input.role {
        stored.role = role;
    }
    if let Some(active) = input.active {
        stored.active = active;
        if active {
            stored.failed_signins = Some(0);
        }
    }
    if let Some(password) = input.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        stored.password = hash_password(&password)?;
        stored.failed_signins = Some(0);
    }
    stored.updated_at = Some(Utc::now());

    collection.replace_one(doc! { "_id": oid }, &stored).await?;

    let profile = UserProfile::from(stored);
    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Update,
        "user",
        Some(profile.id.clone()),
        format!("Updated user {}", profile.email),
    )
    .await;

    Ok(HttpResponse::Ok().json(profile))
}

/*
    DELETE /api/admin/users/{id}
*/
pub async fn delete_user(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if id.trim() == user.user_id() {
        return Err(AppError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }
    let oid = parse_object_id(&id)?;

    let removed = mongo::collection::<User>(&data, &config, USERS)
        .find_one_and_delete(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    audit_service::record(
        &data,
        &config,
        user.claims(),
        AuditAction::Delete,
        "user",
        Some(oid.to_hex()),
        format!("Deleted user {}", removed.email),
    )
    .await;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_need_eight_characters() {
        assert!(validate_password("hunter2").is_err());
        assert!(validate_password("correct horse").is_ok());
    }

    #[test]
    fn hashes_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(bcrypt::verify("s3cret-pass", &hash).unwrap());
        assert!(!bcrypt::verify("wrong", &hash).unwrap());
    }
}
