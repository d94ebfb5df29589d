mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{send, TestApp};
use umrah_transport_api::{
    config::AppConfig, middleware::auth::issue_token, models::account::UserRole,
};

#[actix_rt::test]
#[serial]
async fn test_signin_missing_fields() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({ "email": "", "password": "" }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Email and password are required");
}

#[actix_rt::test]
#[serial]
async fn test_session_without_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "No authorization header");
}

#[actix_rt::test]
#[serial]
async fn test_session_with_garbage_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
#[serial]
async fn test_token_from_another_deployment_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let other = AppConfig {
        jwt_secret: "some_other_secret".to_string(),
        ..AppConfig::for_tests()
    };
    let token = issue_token(&other, "admin@example.com", "abc", UserRole::Admin).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid token");
}
