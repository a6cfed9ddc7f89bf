use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::booking::BookingType;
use crate::models::car::{Car, CarChanges, CarQuery, CarType, FuelType, NewCar, Transmission};
use crate::models::geo::GeoPoint;
use crate::utils::validation::{validate_coordinates, validate_image_urls, validate_positive};

fn default_available() -> bool {
    true
}

// Request para crear un coche
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 1))]
    pub make: String,
    #[validate(length(min = 1))]
    pub model: String,
    pub year: i32,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(length(min = 1))]
    pub license_plate: String,
    #[serde(rename = "type")]
    pub car_type: CarType,
    #[validate(range(min = 1, max = 50))]
    pub seats: i32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    #[validate(range(min = 0))]
    pub mileage: i32,
    #[validate(custom = "validate_positive")]
    pub hourly_price: Decimal,
    #[validate(custom = "validate_positive")]
    pub daily_price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_image_urls")]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[validate(custom = "validate_coordinates")]
    pub location: Option<GeoPoint>,
}

impl From<CreateCarRequest> for NewCar {
    fn from(request: CreateCarRequest) -> Self {
        Self {
            make: request.make,
            model: request.model,
            year: request.year,
            color: request.color,
            license_plate: request.license_plate,
            car_type: request.car_type,
            seats: request.seats,
            transmission: request.transmission,
            fuel_type: request.fuel_type,
            mileage: request.mileage,
            hourly_price: request.hourly_price,
            daily_price: request.daily_price,
            images: request.images,
            description: request.description,
            available: request.available,
            location: request.location,
        }
    }
}

// Request para actualizar un coche, todos los campos opcionales
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 1))]
    pub make: Option<String>,
    #[validate(length(min = 1))]
    pub model: Option<String>,
    pub year: Option<i32>,
    #[validate(length(min = 1))]
    pub color: Option<String>,
    #[validate(length(min = 1))]
    pub license_plate: Option<String>,
    #[serde(rename = "type")]
    pub car_type: Option<CarType>,
    #[validate(range(min = 1, max = 50))]
    pub seats: Option<i32>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    #[validate(range(min = 0))]
    pub mileage: Option<i32>,
    #[validate(custom = "validate_positive")]
    pub hourly_price: Option<Decimal>,
    #[validate(custom = "validate_positive")]
    pub daily_price: Option<Decimal>,
    #[validate(custom = "validate_image_urls")]
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub available: Option<bool>,
    #[validate(custom = "validate_coordinates")]
    pub location: Option<GeoPoint>,
}

impl From<UpdateCarRequest> for CarChanges {
    fn from(request: UpdateCarRequest) -> Self {
        Self {
            make: request.make,
            model: request.model,
            year: request.year,
            color: request.color,
            license_plate: request.license_plate,
            car_type: request.car_type,
            seats: request.seats,
            transmission: request.transmission,
            fuel_type: request.fuel_type,
            mileage: request.mileage,
            hourly_price: request.hourly_price,
            daily_price: request.daily_price,
            images: request.images,
            description: request.description,
            available: request.available,
            location: request.location,
        }
    }
}

// Filtros del listado de la flota (query string)
#[derive(Debug, Default, Deserialize)]
pub struct CarListQuery {
    #[serde(rename = "type")]
    pub car_type: Option<CarType>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<Decimal>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<Decimal>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    pub available: Option<bool>,
    pub search: Option<String>,
    pub booking_type: Option<BookingType>,
}

impl From<CarListQuery> for CarQuery {
    fn from(query: CarListQuery) -> Self {
        Self {
            car_type: query.car_type,
            transmission: query.transmission,
            fuel_type: query.fuel_type,
            available: query.available,
            min_price: query.min_price,
            max_price: query.max_price,
            price_basis: query.booking_type.unwrap_or_default(),
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarResponse {
    pub car: Car,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarsResponse {
    pub cars: Vec<Car>,
}
