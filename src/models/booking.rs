//! Modelo de reserva
//!
//! Mapea la tabla `bookings`. Una reserva bloquea un coche durante la ventana
//! `start_date start_time` .. `end_date end_time`; cancelar es un cambio de
//! estado, las filas nunca se borran.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use uuid::Uuid;

use crate::models::car::Car;
use crate::models::geo::GeoPoint;
use crate::models::user::UserProfile;
use crate::services::booking_engine::BookingWindow;

/// Unidad de facturación - mapea el ENUM `booking_type`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "booking_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Hourly,
    #[default]
    Daily,
}

/// Estado del ciclo de vida - mapea el ENUM `booking_status`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Las reservas admitidas ocupan el coche y cuentan en los conflictos
    pub fn is_admitted(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Active
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Estado de pago, independiente del ciclo de vida - mapea el ENUM `payment_status`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Fila de la tabla `bookings`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    pub booking_type: BookingType,
    pub total_hours: Option<i32>,
    pub total_days: Option<i32>,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub pickup_location: Option<Json<GeoPoint>>,
    pub dropoff_location: Option<Json<GeoPoint>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.start_date, self.start_time, self.end_date, self.end_time)
    }

    /// "2 hour(s)" / "3 day(s)"
    pub fn duration_label(&self) -> String {
        match self.booking_type {
            BookingType::Hourly => format!("{} hour(s)", self.total_hours.unwrap_or(0)),
            BookingType::Daily => format!("{} day(s)", self.total_days.unwrap_or(0)),
        }
    }
}

/// Reserva tarificada lista para que la admita un repositorio
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub booking_type: BookingType,
    pub total_hours: Option<i32>,
    pub total_days: Option<i32>,
    pub total_price: Decimal,
    pub pickup_location: Option<GeoPoint>,
    pub dropoff_location: Option<GeoPoint>,
}

impl BookingDraft {
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.start_date, self.start_time, self.end_date, self.end_time)
    }
}

/// Actualización parcial de estado/pago
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingChanges {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl BookingChanges {
    pub fn cancel() -> Self {
        Self {
            status: Some(BookingStatus::Cancelled),
            payment_status: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

/// Filtros de los listados de reservas
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_id.map_or(true, |id| booking.user_id == id)
            && self.car_id.map_or(true, |id| booking.car_id == id)
            && self.status.map_or(true, |s| booking.status == s)
    }
}

/// Reserva con su usuario y su coche, tal como la devuelve la API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub user: Option<UserProfile>,
    pub car: Option<Car>,
}

/// `HH:MM` en JSON, igual que el formato de la petición
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
