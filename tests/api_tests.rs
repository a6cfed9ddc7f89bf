mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use car_rental::clients::StripeClient;
use car_rental::models::user::UserRole;
use car_rental::services::payment_service::PaymentGateway;
use common::{read_json, test_config, TestApp, TEST_PASSWORD};

fn booking_body(car_id: impl ToString, start: (&str, &str), end: (&str, &str), booking_type: &str) -> Value {
    json!({
        "car_id": car_id.to_string(),
        "start_date": start.0,
        "start_time": start.1,
        "end_date": end.0,
        "end_time": end.1,
        "booking_type": booking_type,
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let app = TestApp::new();
    let signup = json!({
        "email": "New.Driver@Example.com",
        "password": "hunter22",
        "full_name": "New Driver",
    });

    let (status, body) = app.send(Method::POST, "/api/auth/signup", None, Some(signup.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "new.driver@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app.send(Method::POST, "/api/auth/signup", None, Some(signup)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already registered");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "new.driver@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "new.driver@example.com", "password": "hunter22" }).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    // La cookie sola ya es una sesión válida
    let session = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let (status, me) = read_json(app.router.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["id"], body["user"]["id"]);
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "not-an-email", "password": "123", "full_name": "X" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new();
    let (status, _) = app.send(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_car_read_is_identical_for_every_caller() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, user_token) = app.token_for("user@example.com", UserRole::User).await;
    let (_, admin_token) = app.token_for("admin@example.com", UserRole::Admin).await;
    let uri = format!("/api/cars/{}", car.id);

    let (anon_status, anon) = app.send(Method::GET, &uri, None, None).await;
    let (user_status, user) = app.send(Method::GET, &uri, Some(&user_token), None).await;
    let (admin_status, admin) = app.send(Method::GET, &uri, Some(&admin_token), None).await;

    assert_eq!(anon_status, StatusCode::OK);
    assert_eq!(user_status, StatusCode::OK);
    assert_eq!(admin_status, StatusCode::OK);
    assert_eq!(anon, user);
    assert_eq!(user, admin);
    assert_eq!(anon["car"]["type"], "sedan");

    let (status, body) = app
        .send(Method::GET, &format!("/api/cars/{}", uuid::Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Car not found");
}

#[tokio::test]
async fn test_car_mutation_is_admin_only() {
    let app = TestApp::new();
    let (_, user_token) = app.token_for("user@example.com", UserRole::User).await;
    let (_, admin_token) = app.token_for("admin@example.com", UserRole::Admin).await;

    let car = json!({
        "make": "Tesla",
        "model": "Model 3",
        "year": 2023,
        "color": "black",
        "license_plate": "EV-0001",
        "type": "sedan",
        "seats": 5,
        "transmission": "automatic",
        "fuel_type": "electric",
        "mileage": 1000,
        "hourly_price": 25.0,
        "daily_price": 120.0,
    });

    let (status, _) = app.send(Method::POST, "/api/cars", None, Some(car.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::POST, "/api/cars", Some(&user_token), Some(car.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut bad_year = car.clone();
    bad_year["year"] = json!(1850);
    let (status, _) = app.send(Method::POST, "/api/cars", Some(&admin_token), Some(bad_year)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::POST, "/api/cars", Some(&admin_token), Some(car)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["car"]["available"], true);
    assert_eq!(body["car"]["images"], json!([]));
    let id = body["car"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/cars/{}", id),
            Some(&admin_token),
            Some(json!({ "available": false, "daily_price": 99.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["car"]["available"], false);
    assert_eq!(body["car"]["daily_price"], 99.5);
    assert_eq!(body["car"]["make"], "Tesla");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cars/{}", id), Some(&user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/cars/{}", id), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Car deleted successfully");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cars/{}", id), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_car_listing_filters() {
    let app = TestApp::new();
    let cheap = app.car(5, 200, true).await;
    let pricey = app.car(40, 60, false).await;

    let (_, body) = app.send(Method::GET, "/api/cars?available=true", None, None).await;
    let ids: Vec<&str> = body["cars"].as_array().unwrap().iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![cheap.id.to_string().as_str()]);

    // Los límites de precio siguen la unidad de facturación pedida
    let (_, hourly) = app
        .send(Method::GET, "/api/cars?booking_type=hourly&maxPrice=10", None, None)
        .await;
    assert_eq!(hourly["cars"].as_array().unwrap().len(), 1);
    assert_eq!(hourly["cars"][0]["id"], cheap.id.to_string());

    let (_, daily) = app.send(Method::GET, "/api/cars?maxPrice=100", None, None).await;
    assert_eq!(daily["cars"].as_array().unwrap().len(), 1);
    assert_eq!(daily["cars"][0]["id"], pricey.id.to_string());

    let (_, all) = app.send(Method::GET, "/api/cars?search=COROLLA", None, None).await;
    assert_eq!(all["cars"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_overlapping_booking_is_rejected() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("driver@example.com", UserRole::User).await;

    let first = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");
    let (status, body) = app.send(Method::POST, "/api/bookings", Some(&token), Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["total_hours"], 4);
    assert_eq!(body["booking"]["total_price"], 40.0);
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["payment_status"], "pending");
    assert_eq!(body["booking"]["car"]["id"], car.id.to_string());

    let overlapping = booking_body(car.id, ("2024-06-01", "12:00"), ("2024-06-01", "16:00"), "hourly");
    let (status, body) = app.send(Method::POST, "/api/bookings", Some(&token), Some(overlapping)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Car is already booked for the selected time period");

    let back_to_back = booking_body(car.id, ("2024-06-01", "14:00"), ("2024-06-01", "16:00"), "hourly");
    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(back_to_back)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_daily_pricing_and_confirmation() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (user, token) = app.token_for("daily@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "09:00"), ("2024-06-03", "09:00"), "daily");
    let (status, body) = app.send(Method::POST, "/api/bookings", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["total_days"], 2);
    assert_eq!(body["booking"]["total_hours"], Value::Null);
    assert_eq!(body["booking"]["total_price"], 100.0);
    assert_eq!(body["booking"]["start_time"], "09:00");
    assert_eq!(body["booking"]["user"]["id"], user.id.to_string());

    let notices = app.wait_for_notices(1).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].email, "daily@example.com");
    assert_eq!(notices[0].duration, "2 day(s)");
}

#[tokio::test]
async fn test_unavailable_car_is_rejected() {
    let app = TestApp::new();
    let car = app.car(10, 50, false).await;
    let (_, token) = app.token_for("driver@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "12:00"), "hourly");
    let (status, body) = app.send(Method::POST, "/api/bookings", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Car is not available");
}

#[tokio::test]
async fn test_booking_input_validation() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("driver@example.com", UserRole::User).await;

    let backwards = booking_body(car.id, ("2024-06-02", "10:00"), ("2024-06-01", "10:00"), "daily");
    let (status, body) = app.send(Method::POST, "/api/bookings", Some(&token), Some(backwards)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let bad_format = booking_body(car.id, ("06/01/2024", "10:00"), ("2024-06-01", "12:00"), "hourly");
    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(bad_format)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let not_a_date = booking_body(car.id, ("2024-02-30", "10:00"), ("2024-03-01", "12:00"), "hourly");
    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(not_a_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown_car = booking_body(uuid::Uuid::new_v4(), ("2024-06-01", "10:00"), ("2024-06-01", "12:00"), "hourly");
    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(unknown_car)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let anonymous = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "12:00"), "hourly");
    let (status, _) = app.send(Method::POST, "/api/bookings", None, Some(anonymous)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_may_only_cancel() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, owner) = app.token_for("owner@example.com", UserRole::User).await;
    let (_, stranger) = app.token_for("stranger@example.com", UserRole::User).await;
    let (_, admin) = app.token_for("admin@example.com", UserRole::Admin).await;

    let body = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&owner), Some(body)).await;
    let uri = format!("/api/bookings/{}", created["booking"]["id"].as_str().unwrap());

    let (status, _) = app.send(Method::GET, &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.send(Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({ "payment_status": "paid" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&stranger), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&admin), Some(json!({ "payment_status": "refunded" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["payment_status"], "refunded");
}

#[tokio::test]
async fn test_delete_cancels_and_frees_the_slot() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("owner@example.com", UserRole::User).await;
    let slot = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");

    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&token), Some(slot.clone())).await;
    let uri = format!("/api/bookings/{}", created["booking"]["id"].as_str().unwrap());

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking cancelled successfully");

    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(slot)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_readmission_rechecks_conflicts() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("owner@example.com", UserRole::User).await;
    let (_, admin) = app.token_for("admin@example.com", UserRole::Admin).await;
    let slot = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");

    let (_, first) = app.send(Method::POST, "/api/bookings", Some(&token), Some(slot.clone())).await;
    let first_uri = format!("/api/bookings/{}", first["booking"]["id"].as_str().unwrap());
    app.send(Method::DELETE, &first_uri, Some(&token), None).await;

    let (status, _) = app.send(Method::POST, "/api/bookings", Some(&token), Some(slot)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(Method::PUT, &first_uri, Some(&admin), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_listing_is_scoped() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (alice, alice_token) = app.token_for("alice@example.com", UserRole::User).await;
    let (_, bob_token) = app.token_for("bob@example.com", UserRole::User).await;
    let (_, admin) = app.token_for("admin@example.com", UserRole::Admin).await;

    let morning = booking_body(car.id, ("2024-06-01", "08:00"), ("2024-06-01", "10:00"), "hourly");
    let evening = booking_body(car.id, ("2024-06-01", "18:00"), ("2024-06-01", "20:00"), "hourly");
    app.send(Method::POST, "/api/bookings", Some(&alice_token), Some(morning)).await;
    app.send(Method::POST, "/api/bookings", Some(&bob_token), Some(evening)).await;

    // Un user_id enviado se ignora para usuarios no admin
    let (status, body) = app
        .send(Method::GET, &format!("/api/bookings?user_id={}", alice.id), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["start_time"], "18:00");

    let (_, body) = app.send(Method::GET, "/api/bookings", Some(&admin), None).await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(Method::GET, &format!("/api/bookings?user_id={}", alice.id), Some(&admin), None)
        .await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(body["bookings"][0]["user"]["email"], "alice@example.com");

    let (status, _) = app.send(Method::GET, "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tracking_visibility() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, owner) = app.token_for("owner@example.com", UserRole::User).await;
    let (_, stranger) = app.token_for("stranger@example.com", UserRole::User).await;
    let (_, admin) = app.token_for("admin@example.com", UserRole::Admin).await;

    let body = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&owner), Some(body)).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    for (lat, lng) in [(48.85, 2.35), (48.86, 2.36)] {
        let (status, _) = app
            .send(
                Method::POST,
                "/api/tracking",
                Some(&admin),
                Some(json!({ "car_id": car.id, "booking_id": booking_id, "latitude": lat, "longitude": lng, "speed": 30.0 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .send(Method::GET, &format!("/api/tracking?booking_id={}", booking_id), Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let samples = body["tracking"].as_array().unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0]["latitude"], 48.86);

    let (status, _) = app
        .send(Method::GET, &format!("/api/tracking?booking_id={}", booking_id), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Las reservas pending no abren el feed del coche
    let car_uri = format!("/api/tracking?car_id={}", car.id);
    let (status, _) = app.send(Method::GET, &car_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.send(
        Method::PUT,
        &format!("/api/bookings/{}", booking_id),
        Some(&admin),
        Some(json!({ "status": "active" })),
    )
    .await;
    let (status, body) = app.send(Method::GET, &format!("{}&limit=1", car_uri), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking"].as_array().unwrap().len(), 1);

    let (_, body) = app.send(Method::GET, "/api/tracking", Some(&stranger), None).await;
    assert!(body["tracking"].as_array().unwrap().is_empty());

    let (_, body) = app.send(Method::GET, "/api/tracking", Some(&admin), None).await;
    assert_eq!(body["tracking"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tracking_append_checks_references() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let other_car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("driver@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "14:00"), "hourly");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&token), Some(body)).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tracking",
            Some(&token),
            Some(json!({ "car_id": other_car.id, "booking_id": booking_id, "latitude": 1.0, "longitude": 1.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Booking not found or does not match car");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/tracking",
            Some(&token),
            Some(json!({ "car_id": uuid::Uuid::new_v4(), "latitude": 1.0, "longitude": 1.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/tracking",
            Some(&token),
            Some(json!({ "car_id": car.id, "latitude": 95.0, "longitude": 1.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_intent() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (user, owner) = app.token_for("payer@example.com", UserRole::User).await;
    let (_, stranger) = app.token_for("stranger@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "09:00"), ("2024-06-03", "09:00"), "daily");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&owner), Some(body)).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();
    let intent = json!({ "booking_id": booking_id, "amount": 100.0, "currency": "USD" });

    let (status, _) = app
        .send(Method::POST, "/api/payments/create-intent", Some(&stranger), Some(intent.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::POST, "/api/payments/create-intent", Some(&owner), Some(intent))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientSecret"], "pi_test_123_secret_abc");
    assert_eq!(body["payment_intent_id"], "pi_test_123");

    let requests = app.gateway.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, 10_000);
    assert_eq!(requests[0].currency, "usd");
    assert_eq!(requests[0].user_id, user.id);

    let (_, booking) = app
        .send(Method::GET, &format!("/api/bookings/{}", booking_id), Some(&owner), None)
        .await;
    assert_eq!(booking["booking"]["payment_intent_id"], "pi_test_123");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/payments/create-intent",
            Some(&owner),
            Some(json!({ "booking_id": uuid::Uuid::new_v4(), "amount": 10.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/payments/create-intent",
            Some(&owner),
            Some(json!({ "booking_id": booking_id, "amount": -5.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_without_stripe_key() {
    let config = test_config();
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(reqwest::Client::new(), &config.stripe));
    let app = TestApp::with_gateway(Some(gateway));
    let car = app.car(10, 50, true).await;
    let (_, token) = app.token_for("payer@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "10:00"), ("2024-06-01", "12:00"), "hourly");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&token), Some(body)).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/payments/create-intent",
            Some(&token),
            Some(json!({ "booking_id": created["booking"]["id"], "amount": 20.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Stripe is not configured");
}

#[tokio::test]
async fn test_concurrent_overlapping_requests_admit_one() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let (_, token) = app.token_for(&format!("racer{}@example.com", i), UserRole::User).await;
        let router = app.router.clone();
        let body = booking_body(car.id, ("2024-07-01", "10:00"), ("2024-07-01", "15:00"), "hourly");
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/bookings")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 7);
}

#[tokio::test]
async fn test_page_gate_redirects() {
    let app = TestApp::new();

    let request = Request::builder().uri("/dashboard").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");

    let request = Request::builder()
        .uri("/auth/login")
        .header(header::COOKIE, "access_token=whatever")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    // Las rutas de API bajo /api/auth nunca se redirigen
    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let app = TestApp::new();
    let (_, user) = app.token_for("user@example.com", UserRole::User).await;
    let (_, admin) = app.token_for("admin@example.com", UserRole::Admin).await;
    let (user, admin) = (user.as_str(), admin.as_str());
    let car = app.car(10, 50, true).await;

    let spaceship = json!({
        "make": "Tesla",
        "model": "Model 3",
        "year": 2023,
        "color": "black",
        "license_plate": "EV-0002",
        "type": "spaceship",
        "seats": 5,
        "transmission": "automatic",
        "fuel_type": "electric",
        "mileage": 1000,
        "hourly_price": 25.0,
        "daily_price": 120.0,
    })
    .to_string();
    let car_uri = format!("/api/cars/{}", car.id);

    let cases: Vec<(Method, &str, &str, Option<String>, StatusCode)> = vec![
        // cuerpos
        (Method::POST, "/api/cars", admin, Some(spaceship), StatusCode::BAD_REQUEST),
        (Method::POST, "/api/cars", admin, Some("not json".into()), StatusCode::BAD_REQUEST),
        (Method::PUT, car_uri.as_str(), admin, Some(r#"{"seats":"many"}"#.into()), StatusCode::BAD_REQUEST),
        (Method::POST, "/api/bookings", user, Some(r#"{"car_id":5}"#.into()), StatusCode::BAD_REQUEST),
        (Method::POST, "/api/tracking", user, Some(r#"{"latitude":"north"}"#.into()), StatusCode::BAD_REQUEST),
        (Method::POST, "/api/payments/create-intent", user, Some("{".into()), StatusCode::BAD_REQUEST),
        (Method::POST, "/api/auth/login", "", Some("{".into()), StatusCode::BAD_REQUEST),
        // rutas
        (Method::GET, "/api/cars/not-a-uuid", "", None, StatusCode::NOT_FOUND),
        (Method::DELETE, "/api/cars/not-a-uuid", admin, None, StatusCode::NOT_FOUND),
        (Method::GET, "/api/bookings/not-a-uuid", user, None, StatusCode::NOT_FOUND),
        (
            Method::PUT,
            "/api/bookings/not-a-uuid",
            user,
            Some(r#"{"status":"cancelled"}"#.into()),
            StatusCode::NOT_FOUND,
        ),
        (Method::DELETE, "/api/bookings/not-a-uuid", user, None, StatusCode::NOT_FOUND),
        // queries
        (Method::GET, "/api/cars?type=spaceship", "", None, StatusCode::BAD_REQUEST),
        (Method::GET, "/api/cars?minPrice=cheap", "", None, StatusCode::BAD_REQUEST),
        (Method::GET, "/api/bookings?status=lost", user, None, StatusCode::BAD_REQUEST),
        (Method::GET, "/api/tracking?limit=abc", user, None, StatusCode::BAD_REQUEST),
        (Method::GET, "/api/tracking?car_id=42", user, None, StatusCode::BAD_REQUEST),
    ];

    let allowed = [
        StatusCode::BAD_REQUEST,
        StatusCode::UNAUTHORIZED,
        StatusCode::FORBIDDEN,
        StatusCode::NOT_FOUND,
        StatusCode::INTERNAL_SERVER_ERROR,
    ];

    for (method, uri, token, body, expected) in cases {
        let label = format!("{} {}", method, uri);
        let mut builder = Request::builder().method(method).uri(uri);
        if !token.is_empty() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(raw) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(raw))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let (status, body) = read_json(response).await;

        assert_eq!(status, expected, "{label}");
        assert!(allowed.contains(&status), "{label}: {status}");
        assert!(content_type.starts_with("application/json"), "{label}: {content_type}");
        assert!(body["error"].is_string(), "{label}: {body}");
        assert!(body["code"].is_string(), "{label}: {body}");
    }
}

#[tokio::test]
async fn test_out_of_range_payment_amount_is_rejected() {
    let app = TestApp::new();
    let car = app.car(10, 50, true).await;
    let (_, owner) = app.token_for("payer@example.com", UserRole::User).await;

    let body = booking_body(car.id, ("2024-06-01", "09:00"), ("2024-06-02", "09:00"), "daily");
    let (_, created) = app.send(Method::POST, "/api/bookings", Some(&owner), Some(body)).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/payments/create-intent",
            Some(&owner),
            Some(json!({ "booking_id": booking_id, "amount": 7.0e28 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(app.gateway.requests.lock().unwrap().is_empty());
}
