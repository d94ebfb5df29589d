use std::future::{ready, Ready};

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};

use crate::error::AppError;
use crate::middleware::auth::Claims;

/// The back-office user behind the current request.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn claims(&self) -> &Claims {
        &self.0
    }

    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }

    pub fn email(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims.clone()))),
            None => ready(Err(
                AppError::Unauthorized("User not authenticated".to_string()).into(),
            )),
        }
    }
}
