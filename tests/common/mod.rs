#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use car_rental::config::EnvironmentConfig;
use car_rental::create_app;
use car_rental::models::car::{Car, CarType, FuelType, NewCar, Transmission};
use car_rental::models::user::{NewUser, User, UserRole};
use car_rental::repositories::{CarRepository, MemoryStore, Repositories, UserRepository};
use car_rental::services::notification_service::{
    BookingNotice, Delivery, NotificationChannel, NotificationDispatcher,
};
use car_rental::services::password_service::hash_password;
use car_rental::services::payment_service::{PaymentGateway, PaymentIntent, PaymentIntentRequest};
use car_rental::state::AppState;
use car_rental::utils::errors::AppResult;

pub const TEST_PASSWORD: &str = "secret123";

/// Pasarela que responde con un intent fijo y guarda las peticiones
#[derive(Default)]
pub struct StubGateway {
    pub requests: Mutex<Vec<PaymentIntentRequest>>,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> AppResult<PaymentIntent> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(PaymentIntent {
            id: "pi_test_123".to_string(),
            client_secret: "pi_test_123_secret_abc".to_string(),
        })
    }
}

/// Canal que guarda cada aviso que recibe
#[derive(Default)]
pub struct RecordingChannel {
    pub notices: Mutex<Vec<BookingNotice>>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, notice: &BookingNotice) -> AppResult<Delivery> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(Delivery::Sent)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<StubGateway>,
    pub channel: Arc<RecordingChannel>,
}

pub fn test_config() -> EnvironmentConfig {
    let mut config = EnvironmentConfig::development("integration-test-secret");
    config.bcrypt_cost = 4;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway(None)
    }

    /// `None` usa el stub que graba
    pub fn with_gateway(gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let stub = Arc::new(StubGateway::default());
        let channel = Arc::new(RecordingChannel::default());

        let payments = gateway.unwrap_or_else(|| stub.clone() as Arc<dyn PaymentGateway>);
        let notifications = NotificationDispatcher::new(vec![channel.clone() as Arc<dyn NotificationChannel>]);

        let state = AppState::new(
            test_config(),
            Repositories::memory(store.clone()),
            payments,
            notifications,
        );

        Self {
            router: create_app(state.clone()),
            state,
            store,
            gateway: stub,
            channel,
        }
    }

    pub async fn user(&self, email: &str, role: UserRole) -> User {
        let password_hash = hash_password(TEST_PASSWORD, 4).await.unwrap();
        UserRepository::create(
            self.store.as_ref(),
            NewUser {
                email: email.to_string(),
                password_hash,
                full_name: "Test Driver".to_string(),
                phone: Some("+15550100".to_string()),
                role,
            },
        )
        .await
        .unwrap()
    }

    /// Bearer token para un usuario nuevo con el rol indicado
    pub async fn token_for(&self, email: &str, role: UserRole) -> (User, String) {
        let user = self.user(email, role).await;
        let token = self.state.jwt.generate_access_token(&user).unwrap().token;
        (user, token)
    }

    pub async fn car(&self, hourly: i64, daily: i64, available: bool) -> Car {
        CarRepository::create(
            self.store.as_ref(),
            NewCar {
                make: "Toyota".to_string(),
                model: "Corolla".to_string(),
                year: 2022,
                color: "white".to_string(),
                license_plate: format!("TST-{}", &Uuid::new_v4().to_string()[..6]),
                car_type: CarType::Sedan,
                seats: 5,
                transmission: Transmission::Automatic,
                fuel_type: FuelType::Hybrid,
                mileage: 12_000,
                hourly_price: Decimal::from(hourly),
                daily_price: Decimal::from(daily),
                images: vec![],
                description: "Reliable city car".to_string(),
                available,
                location: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    /// Espera a que el envío en segundo plano llegue al canal que graba
    pub async fn wait_for_notices(&self, expected: usize) -> Vec<BookingNotice> {
        for _ in 0..50 {
            let notices = self.channel.notices.lock().unwrap().clone();
            if notices.len() >= expected {
                return notices;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.channel.notices.lock().unwrap().clone()
    }
}

pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
