#![allow(dead_code)]

use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web, App,
};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use umrah_transport_api::{
    config::AppConfig,
    db::mongo::build_client,
    middleware::auth::issue_token,
    models::account::UserRole,
    routes,
};

/// The real application wired to a MongoDB client that never connects unless a handler
/// reaches the database. Tests only exercise paths that fail before that point.
pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::for_tests()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let client = build_client(&config.mongo_uri)
            .await
            .expect("test client options parse");
        Self { client, config }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .configure(routes::configure)
    }

    pub fn token(&self, role: UserRole, user_id: &str) -> String {
        let email = format!("{}@example.com", role.as_str());
        let token = issue_token(&self.config, &email, user_id, role).expect("token issues");
        format!("Bearer {}", token)
    }

    pub fn admin_token(&self) -> String {
        self.token(UserRole::Admin, &ObjectId::new().to_hex())
    }

    pub fn editor_token(&self) -> String {
        self.token(UserRole::Editor, &ObjectId::new().to_hex())
    }
}

/// Status and JSON body, whether the error came from a handler or from middleware.
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, serde_json::Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, to_bytes(resp.into_body()).await.unwrap_or_default())
        }
    };
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub fn future_pickup() -> String {
    (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339()
}
