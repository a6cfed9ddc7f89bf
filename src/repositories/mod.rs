//! Repositorios
//!
//! Un trait por tabla, con una implementación PostgreSQL y el store en
//! memoria `MemoryStore`. Los controladores solo ven los traits.

pub mod booking_repository;
pub mod car_repository;
pub mod memory;
pub mod tracking_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

pub use booking_repository::{BookingRepository, PgBookingRepository};
pub use car_repository::{CarRepository, PgCarRepository};
pub use memory::MemoryStore;
pub use tracking_repository::{PgTrackingRepository, TrackingRepository};
pub use user_repository::{PgUserRepository, UserRepository};

/// Los cuatro repositorios de tablas como trait objects
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub cars: Arc<dyn CarRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub tracking: Arc<dyn TrackingRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            cars: Arc::new(PgCarRepository::new(pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(pool.clone())),
            tracking: Arc::new(PgTrackingRepository::new(pool)),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            cars: store.clone(),
            bookings: store.clone(),
            tracking: store,
        }
    }
}
