use std::{rc::Rc, sync::Arc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};

use crate::{
    config::AppConfig,
    db::mongo::{self, USERS},
    error::{AppError, AppResult},
    middleware::auth::Claims,
    models::account::{User, UserRole},
};

/// Role read from the stored account, so nested scopes check it once per request.
#[derive(Debug, Clone, Copy)]
struct VerifiedRole(UserRole);

/// Must sit inside `AuthMiddleware`, which puts the claims in place.
pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: UserRole) -> Self {
        RequireRole {
            required_role: role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service: Rc::new(service),
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    required_role: UserRole,
}

fn insufficient(path: &str, role: UserRole, required: UserRole) -> AppError {
    debug!("Access denied to {}: role {:?}, required {:?}", path, role, required);
    AppError::Forbidden("Insufficient permissions".to_string())
}

/// Deleted, disabled or demoted users lose access before their token expires.
fn check_account(stored: Option<&User>, required: UserRole) -> AppResult<UserRole> {
    let user = stored.ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    if !user.active {
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }
    if !user.role.satisfies(required) {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }
    Ok(user.role)
}

async fn load_account(client: &Client, config: &AppConfig, user_id: &str) -> AppResult<Option<User>> {
    let oid = ObjectId::parse_str(user_id)
        .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))?;
    Ok(mongo::collection::<User>(client, config, USERS)
        .find_one(doc! { "_id": oid })
        .await?)
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let required = self.required_role;
        let verified = req.extensions().get::<VerifiedRole>().copied();
        let claims = req.extensions().get::<Claims>().cloned();

        let Some(claims) = claims else {
            return Box::pin(ready(Err(
                AppError::Unauthorized("No authorization".to_string()).into(),
            )));
        };

        // An outer scope already looked the account up.
        if let Some(VerifiedRole(role)) = verified {
            if !role.satisfies(required) {
                return Box::pin(ready(Err(insufficient(req.path(), role, required).into())));
            }
            return Box::pin(self.service.call(req));
        }

        if !claims.role.satisfies(required) {
            return Box::pin(ready(Err(
                insufficient(req.path(), claims.role, required).into(),
            )));
        }

        let config = req.app_data::<web::Data<AppConfig>>().cloned();
        let client = req.app_data::<web::Data<Arc<Client>>>().cloned();
        let (Some(config), Some(client)) = (config, client) else {
            return Box::pin(ready(Err(
                AppError::Internal("Application state missing".to_string()).into(),
            )));
        };
        if !config.verify_accounts {
            return Box::pin(self.service.call(req));
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let stored = load_account(&client, &config, &claims.user_id).await?;
            let role = check_account(stored.as_ref(), required).map_err(|err| {
                warn!("Stale token for {} refused: {}", claims.sub, err);
                err
            })?;
            req.extensions_mut().insert(VerifiedRole(role));
            service.call(req).await
        })
    }
}
