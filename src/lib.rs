//! Backend de alquiler de coches
//!
//! Catálogo de la flota, reservas con control de conflictos y precios,
//! tracking GPS, payment intents y confirmaciones de reserva sobre HTTP.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{cors_layer, page_gate};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Router completo de la aplicación con sus capas
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", routes::auth_routes::create_auth_router())
        .nest("/api/cars", routes::car_routes::create_car_router())
        .nest("/api/bookings", routes::booking_routes::create_booking_router())
        .nest("/api/tracking", routes::tracking_routes::create_tracking_router())
        .nest("/api/payments", routes::payment_routes::create_payment_router())
        .fallback(fallback)
        .layer(from_fn(page_gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn fallback() -> AppError {
    not_found_error("Route")
}
