//! Motor de reservas
//!
//! Reglas puras de admisión y precio de una solicitud de reserva. Los
//! repositorios llaman a `ensure_no_conflict` dentro de su sección atómica,
//! así la comprobación y el insert no se cruzan con otra petición del mismo coche.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingType};
use crate::models::car::Car;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub const CONFLICT_MESSAGE: &str = "Car is already booked for the selected time period";
pub const UNAVAILABLE_MESSAGE: &str = "Car is not available";

/// Ventana de reserva semiabierta `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BookingWindow {
    pub fn new(
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            start: start_date.and_time(start_time),
            end: end_date.and_time(end_time),
        }
    }

    pub fn is_forward(&self) -> bool {
        self.start < self.end
    }

    /// Ventanas que solo se tocan no se solapan.
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersección por fecha de calendario, filtro grueso antes de `overlaps`
    pub fn shares_dates_with(&self, other: &BookingWindow) -> bool {
        other.start.date() <= self.end.date() && other.end.date() >= self.start.date()
    }
}

/// Rechaza ventanas que terminan antes de empezar o en el mismo instante.
pub fn ensure_forward(window: &BookingWindow) -> AppResult<()> {
    if window.is_forward() {
        Ok(())
    } else {
        Err(validation_error(
            "end_date",
            "end date and time must be after start date and time",
        ))
    }
}

pub fn ensure_available(car: &Car) -> AppResult<()> {
    if car.available {
        Ok(())
    } else {
        Err(AppError::Unavailable(UNAVAILABLE_MESSAGE.to_string()))
    }
}

/// Primera reserva admitida de `car_id` que se solapa con `window`.
///
/// `ignore` omite un id de reserva, se usa al readmitir una reserva
/// existente.
pub fn find_conflict<'a>(
    car_id: Uuid,
    window: &BookingWindow,
    existing: &'a [Booking],
    ignore: Option<Uuid>,
) -> Option<&'a Booking> {
    existing.iter().find(|booking| {
        booking.car_id == car_id
            && booking.status.is_admitted()
            && Some(booking.id) != ignore
            && window.shares_dates_with(&booking.window())
            && window.overlaps(&booking.window())
    })
}

/// `Conflict` si `find_conflict` encuentra algo.
pub fn ensure_no_conflict(
    car_id: Uuid,
    window: &BookingWindow,
    existing: &[Booking],
    ignore: Option<Uuid>,
) -> AppResult<()> {
    match find_conflict(car_id, window, existing, ignore) {
        Some(clash) => {
            tracing::debug!(
                "Booking window {} -> {} clashes with booking {}",
                window.start,
                window.end,
                clash.id
            );
            Err(AppError::Conflict(CONFLICT_MESSAGE.to_string()))
        }
        None => Ok(()),
    }
}

/// Unidades facturables, nunca menos de una.
pub fn duration_units(window: &BookingWindow, booking_type: BookingType) -> i64 {
    let units = match booking_type {
        BookingType::Hourly => (window.end - window.start).num_hours(),
        BookingType::Daily => (window.end.date() - window.start.date()).num_days(),
    };
    units.max(1)
}

/// Duración tarificada de una reserva
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub total_hours: Option<i32>,
    pub total_days: Option<i32>,
    pub total_price: Decimal,
}

pub fn quote(car: &Car, window: &BookingWindow, booking_type: BookingType) -> AppResult<Quote> {
    let units = duration_units(window, booking_type);
    let units = i32::try_from(units)
        .map_err(|_| validation_error("end_date", "booking duration is too long"))?;
    let total_price = car
        .rate_for(booking_type)
        .checked_mul(Decimal::from(units))
        .ok_or_else(|| validation_error("total_price", "booking price is out of range"))?;

    Ok(match booking_type {
        BookingType::Hourly => Quote {
            total_hours: Some(units),
            total_days: None,
            total_price,
        },
        BookingType::Daily => Quote {
            total_hours: None,
            total_days: Some(units),
            total_price,
        },
    })
}
