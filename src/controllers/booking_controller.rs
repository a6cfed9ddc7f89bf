//! Ciclo de vida de las reservas
//!
//! La creación pasa por el motor de conflictos y precios; el repositorio
//! admite el borrador ya tarificado de forma atómica por coche. Las
//! confirmaciones salen en una tarea aparte una vez guardada la reserva.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, BookingsResponse, CreateBookingRequest, MessageResponse,
    UpdateBookingRequest,
};
use crate::models::auth::AuthContext;
use crate::models::booking::{Booking, BookingChanges, BookingDetails, BookingDraft, BookingQuery};
use crate::models::car::Car;
use crate::models::user::UserProfile;
use crate::repositories::{BookingRepository, CarRepository, UserRepository};
use crate::services::authorization_service::{authorize, Action, Resource};
use crate::services::booking_engine::{self, BookingWindow};
use crate::services::notification_service::{BookingNotice, NotificationDispatcher};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::{parse_date, parse_time};

pub const BOOKING_CANCELLED_MESSAGE: &str = "Booking cancelled successfully";

pub struct BookingController {
    users: Arc<dyn UserRepository>,
    cars: Arc<dyn CarRepository>,
    bookings: Arc<dyn BookingRepository>,
    notifications: NotificationDispatcher,
}

impl BookingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            cars: state.cars.clone(),
            bookings: state.bookings.clone(),
            notifications: state.notifications.clone(),
        }
    }

    /// Un usuario que no es admin solo ve sus propias reservas
    pub async fn list(&self, caller: &AuthContext, query: BookingListQuery) -> AppResult<BookingsResponse> {
        authorize(Some(caller), Resource::Bookings, Action::Read).into_result()?;

        let mut query = BookingQuery::from(query);
        if !caller.is_admin() {
            query.user_id = Some(caller.user_id);
        }

        let bookings = self.bookings.list(&query).await?;
        debug!("📋 {} bookings listed for {}", bookings.len(), caller.user_id);

        Ok(BookingsResponse {
            bookings: self.details_for_all(bookings).await?,
        })
    }

    pub async fn create(&self, caller: &AuthContext, request: CreateBookingRequest) -> AppResult<BookingResponse> {
        authorize(Some(caller), Resource::Bookings, Action::Create).into_result()?;

        let start_date = parse_date("start_date", &request.start_date)?;
        let end_date = parse_date("end_date", &request.end_date)?;
        let start_time = parse_time("start_time", &request.start_time)?;
        let end_time = parse_time("end_time", &request.end_time)?;

        let window = BookingWindow::new(start_date, start_time, end_date, end_time);
        booking_engine::ensure_forward(&window)?;

        let car = self
            .cars
            .find_by_id(request.car_id)
            .await?
            .ok_or_else(|| not_found_error("Car"))?;
        booking_engine::ensure_available(&car)?;

        let quote = booking_engine::quote(&car, &window, request.booking_type)?;

        let booking = self
            .bookings
            .create_admitted(BookingDraft {
                user_id: caller.user_id,
                car_id: car.id,
                start_date,
                end_date,
                start_time,
                end_time,
                booking_type: request.booking_type,
                total_hours: quote.total_hours,
                total_days: quote.total_days,
                total_price: quote.total_price,
                pickup_location: request.pickup_location,
                dropoff_location: request.dropoff_location,
            })
            .await?;

        info!(
            "📅 Booking {} created for car {} by {} ({})",
            booking.id,
            car.id,
            caller.user_id,
            booking.duration_label()
        );

        self.notifications.spawn(BookingNotice::new(&booking, &car, caller));

        let user = self.profile(caller.user_id).await?;
        Ok(BookingResponse {
            booking: BookingDetails {
                booking,
                user,
                car: Some(car),
            },
        })
    }

    pub async fn get(&self, caller: &AuthContext, id: Uuid) -> AppResult<BookingResponse> {
        let booking = self.find(id).await?;
        authorize(Some(caller), Resource::Booking(&booking), Action::Read).into_result()?;

        Ok(BookingResponse {
            booking: self.details(booking).await?,
        })
    }

    pub async fn update(&self, caller: &AuthContext, id: Uuid, request: UpdateBookingRequest) -> AppResult<BookingResponse> {
        let existing = self.find(id).await?;
        let changes = BookingChanges::from(request);
        authorize(Some(caller), Resource::Booking(&existing), Action::Change(&changes)).into_result()?;

        let booking = if changes.is_empty() {
            existing
        } else {
            let updated = self.bookings.update(id, changes).await?;
            info!(
                "📅 Booking {} updated by {}: status={}",
                updated.id,
                caller.user_id,
                updated.status.as_str()
            );
            updated
        };

        Ok(BookingResponse {
            booking: self.details(booking).await?,
        })
    }

    /// DELETE nunca borra la fila, cancela la reserva
    pub async fn cancel(&self, caller: &AuthContext, id: Uuid) -> AppResult<MessageResponse> {
        let existing = self.find(id).await?;
        authorize(Some(caller), Resource::Booking(&existing), Action::Delete).into_result()?;

        self.bookings.update(id, BookingChanges::cancel()).await?;
        info!("🚫 Booking {} cancelled by {}", id, caller.user_id);

        Ok(MessageResponse::new(BOOKING_CANCELLED_MESSAGE))
    }

    async fn find(&self, id: Uuid) -> AppResult<Booking> {
        self.bookings.find_by_id(id).await?.ok_or_else(|| not_found_error("Booking"))
    }

    async fn profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.find_by_id(user_id).await?.map(UserProfile::from))
    }

    async fn details(&self, booking: Booking) -> AppResult<BookingDetails> {
        let user = self.profile(booking.user_id).await?;
        let car = self.cars.find_by_id(booking.car_id).await?;
        Ok(BookingDetails { booking, user, car })
    }

    /// Une usuarios y coches, buscando cada uno una sola vez
    async fn details_for_all(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingDetails>> {
        let mut users: HashMap<Uuid, Option<UserProfile>> = HashMap::new();
        let mut cars: HashMap<Uuid, Option<Car>> = HashMap::new();
        let mut details = Vec::with_capacity(bookings.len());

        for booking in bookings {
            if !users.contains_key(&booking.user_id) {
                users.insert(booking.user_id, self.profile(booking.user_id).await?);
            }
            if !cars.contains_key(&booking.car_id) {
                cars.insert(booking.car_id, self.cars.find_by_id(booking.car_id).await?);
            }

            details.push(BookingDetails {
                user: users.get(&booking.user_id).cloned().flatten(),
                car: cars.get(&booking.car_id).cloned().flatten(),
                booking,
            });
        }

        Ok(details)
    }
}
