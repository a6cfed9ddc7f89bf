//! Visibilidad del tracking
//!
//! Convierte el usuario y los filtros pedidos en el alcance que puede cubrir
//! una lectura de tracking. Los admins lo ven todo; el resto solo ve
//! muestras de sus propias reservas.

use uuid::Uuid;

use crate::models::auth::AuthContext;
use crate::models::tracking::TrackingQuery;
use crate::repositories::BookingRepository;
use crate::utils::errors::{forbidden_error, AppResult};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub async fn visible_scope(
    caller: &AuthContext,
    booking_id: Option<Uuid>,
    car_id: Option<Uuid>,
    limit: Option<i64>,
    bookings: &dyn BookingRepository,
) -> AppResult<TrackingQuery> {
    let limit = clamp_limit(limit);

    if caller.is_admin() {
        return Ok(TrackingQuery {
            booking_id,
            car_id,
            owner_id: None,
            limit,
        });
    }

    if let Some(id) = booking_id {
        let owned = bookings
            .find_by_id(id)
            .await?
            .map_or(false, |booking| caller.owns(booking.user_id));
        if !owned {
            return Err(forbidden_error("Forbidden"));
        }
        return Ok(TrackingQuery {
            booking_id: Some(id),
            car_id,
            owner_id: None,
            limit,
        });
    }

    if let Some(car_id) = car_id {
        let booking = bookings
            .find_active_for_user_and_car(caller.user_id, car_id)
            .await?
            .ok_or_else(|| forbidden_error("Forbidden"))?;
        return Ok(TrackingQuery {
            booking_id: Some(booking.id),
            car_id: Some(car_id),
            owner_id: None,
            limit,
        });
    }

    Ok(TrackingQuery {
        booking_id: None,
        car_id: None,
        owner_id: Some(caller.user_id),
        limit,
    })
}
