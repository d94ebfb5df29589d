mod common;

use actix_web::{http::header, test};
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use serial_test::serial;

use common::{send, TestApp};
use umrah_transport_api::{config::AppConfig, models::account::UserRole};

#[actix_rt::test]
#[serial]
async fn test_admin_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for uri in [
        "/api/admin/bookings",
        "/api/admin/reviews",
        "/api/admin/users",
        "/api/admin/pricing",
        "/api/admin/audit-logs",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, 401, "{} should require a token", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_editor_cannot_reach_admin_only_sections() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let token = test_app.editor_token();

    let requests = vec![
        test::TestRequest::get().uri("/api/admin/users"),
        test::TestRequest::get().uri("/api/admin/pricing"),
        test::TestRequest::get().uri("/api/admin/audit-logs"),
        test::TestRequest::get().uri("/api/admin/fleet"),
        test::TestRequest::get().uri("/api/admin/routes"),
        test::TestRequest::put()
            .uri("/api/admin/settings")
            .set_json(&json!({})),
    ];

    for req in requests {
        let req = req
            .insert_header((header::AUTHORIZATION, token.clone()))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 403);
        assert_eq!(body["error"], "Insufficient permissions");
    }
}

#[actix_rt::test]
#[serial]
async fn test_editor_booking_id_is_validated() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings/not-an-id")
        .insert_header((header::AUTHORIZATION, test_app.editor_token()))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid id format: not-an-id");
}

#[actix_rt::test]
#[serial]
async fn test_moderation_cannot_reset_to_pending() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/reviews/{}/moderate", ObjectId::new().to_hex()))
        .insert_header((header::AUTHORIZATION, test_app.editor_token()))
        .set_json(&json!({ "status": "pending" }))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_content_key_must_be_a_slug() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri("/api/admin/content/About%20Us")
        .insert_header((header::AUTHORIZATION, test_app.editor_token()))
        .set_json(&json!({ "title": "About us", "body": "<p>Since 2010</p>" }))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_gallery_item_needs_an_image() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/gallery")
        .insert_header((header::AUTHORIZATION, test_app.editor_token()))
        .set_json(&json!({ "caption": "Masjid al-Haram at dusk" }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Provide an image or an image URL");
}

#[actix_rt::test]
#[serial]
async fn test_discount_percentage_over_100_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri("/api/admin/pricing/discount")
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({
            "enabled": true,
            "kind": "percentage",
            "value": 150.0,
            "start_date": null,
            "end_date": null,
            "label": "Ramadan"
        }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Percentage discount cannot exceed 100");
}

#[actix_rt::test]
#[serial]
async fn test_discount_window_must_be_ordered() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri("/api/admin/pricing/discount")
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({
            "enabled": true,
            "kind": "fixed",
            "value": 50.0,
            "start_date": "2025-03-30",
            "end_date": "2025-03-01",
            "label": null
        }))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_negative_rate_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/admin/pricing/rates/{}/{}",
            ObjectId::new().to_hex(),
            ObjectId::new().to_hex()
        ))
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({ "price": -25.0 }))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_vehicle_capacity_must_be_positive() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/fleet")
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({
            "name": "Hyundai Staria",
            "category": "van",
            "passenger_capacity": 0,
            "luggage_capacity": 6
        }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Passenger capacity must be at least 1");
}

#[actix_rt::test]
#[serial]
async fn test_admin_cannot_delete_themselves() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let own_id = ObjectId::new().to_hex();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/users/{}", own_id))
        .insert_header((header::AUTHORIZATION, test_app.token(UserRole::Admin, &own_id)))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 403);
}

#[actix_rt::test]
#[serial]
async fn test_new_user_needs_a_real_password() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({
            "email": "driver.desk@example.com",
            "password": "short",
            "name": "Dispatch",
            "role": "editor"
        }))
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_settings_reject_invalid_contact_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri("/api/admin/settings")
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .set_json(&json!({
            "site_name": "Umrah Transport",
            "contact_email": "not-an-email",
            "contact_phone": "+966 50 123 4567",
            "currency": "SAR",
            "min_booking_notice_hours": 12
        }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Invalid contact email");
}

#[actix_rt::test]
#[serial]
async fn test_clearing_a_rate_validates_ids() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/admin/pricing/rates/not-an-id/{}",
            ObjectId::new().to_hex()
        ))
        .insert_header((header::AUTHORIZATION, test_app.admin_token()))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid id format: not-an-id");
}

#[actix_rt::test]
#[serial]
async fn test_account_behind_token_is_rechecked() {
    let test_app = TestApp::with_config(AppConfig {
        verify_accounts: true,
        ..AppConfig::for_tests()
    })
    .await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings")
        .insert_header((header::AUTHORIZATION, test_app.token(UserRole::Admin, "retired-account")))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid user ID");
}
