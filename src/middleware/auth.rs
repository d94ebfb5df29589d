use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use chrono::{Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::AppError, models::account::UserRole};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // subject (email)
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
    pub role: UserRole,
}

pub fn issue_token(
    config: &AppConfig,
    email: &str,
    user_id: &str,
    role: UserRole,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(config.jwt_ttl_hours)).timestamp() as usize,
        user_id: user_id.to_string(),
        role,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(token) = token else {
            return Box::pin(ready(Err(
                AppError::Unauthorized("No authorization header".to_string()).into(),
            )));
        };

        let Some(config) = req.app_data::<web::Data<AppConfig>>() else {
            return Box::pin(ready(Err(
                AppError::Internal("Application config missing".to_string()).into(),
            )));
        };

        match verify_token(config, &token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(err) => {
                debug!("Rejected bearer token: {:?}", err);
                Box::pin(ready(Err(
                    AppError::Unauthorized("Invalid token".to_string()).into(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let config = AppConfig::for_tests();
        let token = issue_token(&config, "ops@example.com", "abc123", UserRole::Editor).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "ops@example.com");
        assert_eq!(claims.user_id, "abc123");
        assert_eq!(claims.role, UserRole::Editor);
    }

    #[test]
    fn tokens_signed_with_another_secret_fail() {
        let config = AppConfig::for_tests();
        let mut other = AppConfig::for_tests();
        other.jwt_secret = "another".to_string();
        let token = issue_token(&other, "ops@example.com", "abc123", UserRole::Admin).unwrap();
        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn expired_tokens_fail() {
        let mut config = AppConfig::for_tests();
        config.jwt_ttl_hours = -2;
        let token = issue_token(&config, "ops@example.com", "abc123", UserRole::Admin).unwrap();
        assert!(verify_token(&config, &token).is_err());
    }
}
