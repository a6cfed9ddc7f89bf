//! Modelo de tracking
//!
//! Una muestra GPS por fila en la tabla `tracking`, solo de inserción.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fila de la tabla `tracking`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Tracking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Muestra a añadir
#[derive(Debug, Clone)]
pub struct NewTrackingSample {
    pub car_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

/// Alcance de lectura resuelto, tras pasar el filtro de visibilidad
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingQuery {
    pub booking_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    /// Limita a muestras de reservas de este usuario
    pub owner_id: Option<Uuid>,
    pub limit: i64,
}
