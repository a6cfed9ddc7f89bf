//! Store en memoria
//!
//! Implementa cada trait de repositorio con vectores detrás de un único mutex
//! async. Lo usan los tests de integración y `main` en desarrollo cuando no
//! hay `DATABASE_URL`. Cada operación mantiene el lock desde su primera
//! lectura hasta su última escritura, así las comprobaciones de conflicto son atómicas.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingChanges, BookingDraft, BookingQuery, BookingStatus, PaymentStatus};
use crate::models::car::{Car, CarQuery, NewCar};
use crate::models::tracking::{NewTrackingSample, Tracking, TrackingQuery};
use crate::models::user::{NewUser, User};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::{CarRepository, CAR_IN_USE_MESSAGE};
use crate::repositories::tracking_repository::TrackingRepository;
use crate::repositories::user_repository::{UserRepository, DUPLICATE_EMAIL_MESSAGE};
use crate::services::booking_engine;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    cars: Vec<Car>,
    bookings: Vec<Booking>,
    tracking: Vec<Tracking>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Más recientes primero, por `created_at`
fn newest_first<T: Clone>(rows: impl Iterator<Item = T>, created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        let email = user.email.to_lowercase();

        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL_MESSAGE.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl CarRepository for MemoryStore {
    async fn list(&self, query: &CarQuery) -> AppResult<Vec<Car>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables.cars.iter().filter(|car| query.matches(car)).cloned(),
            |car| car.created_at,
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>> {
        let tables = self.tables.lock().await;
        Ok(tables.cars.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, car: NewCar) -> AppResult<Car> {
        let now = Utc::now();
        let car = Car {
            id: Uuid::new_v4(),
            make: car.make,
            model: car.model,
            year: car.year,
            color: car.color,
            license_plate: car.license_plate,
            car_type: car.car_type,
            seats: car.seats,
            transmission: car.transmission,
            fuel_type: car.fuel_type,
            mileage: car.mileage,
            hourly_price: car.hourly_price,
            daily_price: car.daily_price,
            images: car.images,
            description: car.description,
            available: car.available,
            location: car.location.map(Json),
            created_at: now,
            updated_at: now,
        };

        self.tables.lock().await.cars.push(car.clone());
        Ok(car)
    }

    async fn update(&self, car: &Car) -> AppResult<Option<Car>> {
        let mut tables = self.tables.lock().await;
        let Some(slot) = tables.cars.iter_mut().find(|c| c.id == car.id) else {
            return Ok(None);
        };

        *slot = Car {
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..car.clone()
        };
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;

        let referenced = tables.bookings.iter().any(|b| b.car_id == id)
            || tables.tracking.iter().any(|t| t.car_id == id);
        if referenced {
            return Err(AppError::BadRequest(CAR_IN_USE_MESSAGE.to_string()));
        }

        let before = tables.cars.len();
        tables.cars.retain(|c| c.id != id);
        Ok(tables.cars.len() < before)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(
            tables.bookings.iter().filter(|b| query.matches(b)).cloned(),
            |b| b.created_at,
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn create_admitted(&self, draft: BookingDraft) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;

        let car = tables
            .cars
            .iter()
            .find(|c| c.id == draft.car_id)
            .ok_or_else(|| not_found_error("Car"))?;
        booking_engine::ensure_available(car)?;

        let window = draft.window();
        booking_engine::ensure_no_conflict(draft.car_id, &window, &tables.bookings, None)?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            car_id: draft.car_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            booking_type: draft.booking_type,
            total_hours: draft.total_hours,
            total_days: draft.total_days,
            total_price: draft.total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            pickup_location: draft.pickup_location.map(Json),
            dropoff_location: draft.dropoff_location.map(Json),
            created_at: now,
            updated_at: now,
        };
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;

        let index = tables
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found_error("Booking"))?;
        let current = &tables.bookings[index];

        let readmitted = changes
            .status
            .map_or(false, |next| next.is_admitted() && !current.status.is_admitted());
        if readmitted {
            booking_engine::ensure_no_conflict(current.car_id, &current.window(), &tables.bookings, Some(id))?;
        }

        let booking = &mut tables.bookings[index];
        if let Some(status) = changes.status {
            booking.status = status;
        }
        if let Some(payment_status) = changes.payment_status {
            booking.payment_status = payment_status;
        }
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn find_active_for_user_and_car(
        &self,
        user_id: Uuid,
        car_id: Uuid,
    ) -> AppResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        let found = newest_first(
            tables.bookings.iter().filter(|b| {
                b.user_id == user_id
                    && b.car_id == car_id
                    && matches!(b.status, BookingStatus::Confirmed | BookingStatus::Active)
            }),
            |b| b.created_at,
        );
        Ok(found.first().map(|b| (*b).clone()))
    }

    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found_error("Booking"))?;

        booking.payment_intent_id = Some(payment_intent_id.to_string());
        booking.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TrackingRepository for MemoryStore {
    async fn list(&self, query: &TrackingQuery) -> AppResult<Vec<Tracking>> {
        let tables = self.tables.lock().await;

        let owned = |booking_id: Option<Uuid>| match (query.owner_id, booking_id) {
            (None, _) => true,
            (Some(owner), Some(id)) => tables
                .bookings
                .iter()
                .any(|b| b.id == id && b.user_id == owner),
            (Some(_), None) => false,
        };

        let mut samples: Vec<Tracking> = tables
            .tracking
            .iter()
            .filter(|t| query.booking_id.map_or(true, |id| t.booking_id == Some(id)))
            .filter(|t| query.car_id.map_or(true, |id| t.car_id == id))
            .filter(|t| owned(t.booking_id))
            .cloned()
            .collect();

        samples.sort_by_key(|t| std::cmp::Reverse(t.timestamp));
        samples.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(samples)
    }

    async fn append(&self, sample: NewTrackingSample) -> AppResult<Tracking> {
        let tracking = Tracking {
            id: Uuid::new_v4(),
            car_id: sample.car_id,
            booking_id: sample.booking_id,
            latitude: sample.latitude,
            longitude: sample.longitude,
            speed: sample.speed,
            heading: sample.heading,
            timestamp: Utc::now(),
        };

        self.tables.lock().await.tracking.push(tracking.clone());
        Ok(tracking)
    }
}
