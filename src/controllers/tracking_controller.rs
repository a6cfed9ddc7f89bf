use std::sync::Arc;

use tracing::debug;

use crate::dto::tracking_dto::{CreateTrackingRequest, TrackingListQuery, TrackingListResponse, TrackingResponse};
use crate::models::auth::AuthContext;
use crate::models::tracking::NewTrackingSample;
use crate::repositories::{BookingRepository, CarRepository, TrackingRepository};
use crate::services::authorization_service::{authorize, Action, Resource};
use crate::services::tracking_service::visible_scope;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub const BOOKING_MISMATCH_MESSAGE: &str = "Booking not found or does not match car";

pub struct TrackingController {
    cars: Arc<dyn CarRepository>,
    bookings: Arc<dyn BookingRepository>,
    tracking: Arc<dyn TrackingRepository>,
}

impl TrackingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            cars: state.cars.clone(),
            bookings: state.bookings.clone(),
            tracking: state.tracking.clone(),
        }
    }

    pub async fn list(&self, caller: &AuthContext, query: TrackingListQuery) -> AppResult<TrackingListResponse> {
        authorize(Some(caller), Resource::Tracking, Action::Read).into_result()?;

        let scope = visible_scope(
            caller,
            query.booking_id,
            query.car_id,
            query.limit,
            self.bookings.as_ref(),
        )
        .await?;

        let tracking = self.tracking.list(&scope).await?;
        debug!("📍 {} tracking samples returned to {}", tracking.len(), caller.user_id);

        Ok(TrackingListResponse { tracking })
    }

    pub async fn record(&self, caller: &AuthContext, request: CreateTrackingRequest) -> AppResult<TrackingResponse> {
        authorize(Some(caller), Resource::Tracking, Action::Create).into_result()?;

        if self.cars.find_by_id(request.car_id).await?.is_none() {
            return Err(not_found_error("Car"));
        }

        if let Some(booking_id) = request.booking_id {
            let matches_car = self
                .bookings
                .find_by_id(booking_id)
                .await?
                .map_or(false, |booking| booking.car_id == request.car_id);
            if !matches_car {
                return Err(AppError::NotFound(BOOKING_MISMATCH_MESSAGE.to_string()));
            }
        }

        let tracking = self.tracking.append(NewTrackingSample::from(request)).await?;
        debug!("📍 Sample {} recorded for car {}", tracking.id, tracking.car_id);

        Ok(TrackingResponse { tracking })
    }
}
