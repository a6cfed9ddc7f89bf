//! Modelo de coche
//!
//! Mapea la tabla `cars`. La disponibilidad es un flag manual de los admins;
//! nunca se deriva de las reservas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use uuid::Uuid;

use crate::models::booking::BookingType;
use crate::models::geo::GeoPoint;

/// Tipo de carrocería - mapea el ENUM `car_type`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "car_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Sedan,
    Suv,
    Hatchback,
    Coupe,
    Convertible,
    Truck,
    Van,
}

/// Mapea el ENUM `transmission`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "transmission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

/// Mapea el ENUM `fuel_type`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "fuel_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

/// Fila de la tabla `cars`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub license_plate: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub car_type: CarType,
    pub seats: i32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub mileage: i32,
    pub hourly_price: Decimal,
    pub daily_price: Decimal,
    pub images: Vec<String>,
    pub description: String,
    pub available: bool,
    pub location: Option<Json<GeoPoint>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Tarifa por unidad según el tipo de reserva
    pub fn rate_for(&self, booking_type: BookingType) -> Decimal {
        match booking_type {
            BookingType::Hourly => self.hourly_price,
            BookingType::Daily => self.daily_price,
        }
    }

    /// Etiqueta "Marca Modelo (Año)" usada en las notificaciones
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.year)
    }

    /// Aplica una actualización parcial in situ
    pub fn apply(&mut self, changes: CarChanges) {
        if let Some(make) = changes.make {
            self.make = make;
        }
        if let Some(model) = changes.model {
            self.model = model;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(license_plate) = changes.license_plate {
            self.license_plate = license_plate;
        }
        if let Some(car_type) = changes.car_type {
            self.car_type = car_type;
        }
        if let Some(seats) = changes.seats {
            self.seats = seats;
        }
        if let Some(transmission) = changes.transmission {
            self.transmission = transmission;
        }
        if let Some(fuel_type) = changes.fuel_type {
            self.fuel_type = fuel_type;
        }
        if let Some(mileage) = changes.mileage {
            self.mileage = mileage;
        }
        if let Some(hourly_price) = changes.hourly_price {
            self.hourly_price = hourly_price;
        }
        if let Some(daily_price) = changes.daily_price {
            self.daily_price = daily_price;
        }
        if let Some(images) = changes.images {
            self.images = images;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(available) = changes.available {
            self.available = available;
        }
        if let Some(location) = changes.location {
            self.location = Some(Json(location));
        }
    }
}

/// Campos necesarios para insertar un coche
#[derive(Debug, Clone)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub license_plate: String,
    pub car_type: CarType,
    pub seats: i32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub mileage: i32,
    pub hourly_price: Decimal,
    pub daily_price: Decimal,
    pub images: Vec<String>,
    pub description: String,
    pub available: bool,
    pub location: Option<GeoPoint>,
}

/// Actualización parcial de un coche
#[derive(Debug, Clone, Default)]
pub struct CarChanges {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
    pub car_type: Option<CarType>,
    pub seats: Option<i32>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    pub mileage: Option<i32>,
    pub hourly_price: Option<Decimal>,
    pub daily_price: Option<Decimal>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub location: Option<GeoPoint>,
}

/// Filtros del listado de la flota
#[derive(Debug, Clone, Default)]
pub struct CarQuery {
    pub car_type: Option<CarType>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    pub available: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Tarifa contra la que se comparan los límites de precio
    pub price_basis: BookingType,
    pub search: Option<String>,
}

impl CarQuery {
    /// Mismo predicado que aplica el listado SQL, usado por el store en memoria
    pub fn matches(&self, car: &Car) -> bool {
        if self.car_type.map_or(false, |t| t != car.car_type) {
            return false;
        }
        if self.transmission.map_or(false, |t| t != car.transmission) {
            return false;
        }
        if self.fuel_type.map_or(false, |f| f != car.fuel_type) {
            return false;
        }
        if self.available.map_or(false, |a| a != car.available) {
            return false;
        }

        let price = car.rate_for(self.price_basis);
        if self.min_price.map_or(false, |min| price < min) {
            return false;
        }
        if self.max_price.map_or(false, |max| price > max) {
            return false;
        }

        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                [&car.make, &car.model, &car.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}
