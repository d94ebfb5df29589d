mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{future_pickup, send, TestApp};

fn wizard_body() -> serde_json::Value {
    json!({
        "route_id": "65f1c0ffee0000000000aa01",
        "vehicle_id": "65f1c0ffee0000000000bb01",
        "pickup_at": future_pickup(),
        "passengers": 4,
        "luggage": 3,
        "name": "Aisha Rahman",
        "email": "aisha@example.com",
        "phone": "+44 7700 900123",
        "flight_number": "SV 116"
    })
}

#[actix_rt::test]
#[serial]
async fn test_liveness() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert_eq!(body, "OK");
}

#[actix_rt::test]
#[serial]
async fn test_wizard_booking_requires_name() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut body = wizard_body();
    body["name"] = json!("  ");
    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(&body)
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Name is required");
}

#[actix_rt::test]
#[serial]
async fn test_wizard_booking_requires_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut body = wizard_body();
    body["email"] = json!("");
    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(&body)
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Email is required");
}

#[actix_rt::test]
#[serial]
async fn test_wizard_booking_rejects_bad_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let mut body = wizard_body();
    body["email"] = json!("aisha@localhost");
    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(&body)
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 422);
}

#[actix_rt::test]
#[serial]
async fn test_quick_booking_rejects_bad_phone() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings/quick")
        .set_json(&json!({
            "route_id": "65f1c0ffee0000000000aa01",
            "vehicle_id": "65f1c0ffee0000000000bb01",
            "pickup_at": future_pickup(),
            "passengers": 2,
            "name": "Omar",
            "phone": "call me"
        }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Invalid phone number");
}

#[actix_rt::test]
#[serial]
async fn test_booking_with_malformed_json() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"route_id\": ")
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_rt::test]
#[serial]
async fn test_lookup_requires_contact_detail() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/bookings/UT-ABCD1234")
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[serial]
async fn test_quote_requires_route_and_vehicle() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/pricing/quote?route_id=65f1c0ffee0000000000aa01")
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
}

#[actix_rt::test]
#[serial]
async fn test_quote_with_invalid_ids() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/pricing/quote?route_id=not-an-id&vehicle_id=also-not")
        .to_request();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
#[serial]
async fn test_review_rating_out_of_range() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/reviews")
        .set_json(&json!({
            "name": "Bilal",
            "rating": 6,
            "comment": "Driver was waiting at arrivals."
        }))
        .to_request();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Rating must be between 1 and 5");
}
