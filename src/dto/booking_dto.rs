use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::{BookingChanges, BookingDetails, BookingQuery, BookingStatus, BookingType, PaymentStatus};
use crate::models::geo::GeoPoint;
use crate::utils::validation::validate_coordinates;

// Request de reserva; la validez de calendario se comprueba tras el formato
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    #[validate(regex(path = "crate::utils::validation::DATE_RE", message = "must be YYYY-MM-DD"))]
    pub start_date: String,
    #[validate(regex(path = "crate::utils::validation::DATE_RE", message = "must be YYYY-MM-DD"))]
    pub end_date: String,
    #[validate(regex(path = "crate::utils::validation::TIME_RE", message = "must be HH:MM"))]
    pub start_time: String,
    #[validate(regex(path = "crate::utils::validation::TIME_RE", message = "must be HH:MM"))]
    pub end_time: String,
    pub booking_type: BookingType,
    #[validate(custom = "validate_coordinates")]
    pub pickup_location: Option<GeoPoint>,
    #[validate(custom = "validate_coordinates")]
    pub dropoff_location: Option<GeoPoint>,
}

// Actualización de estado / pago
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl From<UpdateBookingRequest> for BookingChanges {
    fn from(request: UpdateBookingRequest) -> Self {
        Self {
            status: request.status,
            payment_status: request.payment_status,
        }
    }
}

// Filtros del listado (query string)
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
}

impl From<BookingListQuery> for BookingQuery {
    fn from(query: BookingListQuery) -> Self {
        Self {
            user_id: query.user_id,
            car_id: query.car_id,
            status: query.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking: BookingDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingsResponse {
    pub bookings: Vec<BookingDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
