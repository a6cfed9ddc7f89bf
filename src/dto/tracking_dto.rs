use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::geo::GeoPoint;
use crate::models::tracking::{NewTrackingSample, Tracking};
use crate::utils::validation::validate_coordinates;

fn validate_position(request: &CreateTrackingRequest) -> Result<(), ValidationError> {
    validate_coordinates(&request.position())
}

// Muestra GPS de un dispositivo o de un admin
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_position"))]
pub struct CreateTrackingRequest {
    pub car_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

impl CreateTrackingRequest {
    pub fn position(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

impl From<CreateTrackingRequest> for NewTrackingSample {
    fn from(request: CreateTrackingRequest) -> Self {
        Self {
            car_id: request.car_id,
            booking_id: request.booking_id,
            latitude: request.latitude,
            longitude: request.longitude,
            speed: request.speed,
            heading: request.heading,
        }
    }
}

// Filtros de lectura (query string)
#[derive(Debug, Default, Deserialize)]
pub struct TrackingListQuery {
    pub booking_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackingListResponse {
    pub tracking: Vec<Tracking>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub tracking: Tracking,
}
