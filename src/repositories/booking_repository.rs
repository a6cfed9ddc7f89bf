use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingChanges, BookingDraft, BookingQuery};
use crate::services::booking_engine::{self, BookingWindow, CONFLICT_MESSAGE, UNAVAILABLE_MESSAGE};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reservas que cumplen los filtros, las más recientes primero
    async fn list(&self, query: &BookingQuery) -> AppResult<Vec<Booking>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Vuelve a comprobar la disponibilidad del coche y luego ejecuta la búsqueda
    /// de conflictos y el insert como un único paso atómico por coche.
    async fn create_admitted(&self, draft: BookingDraft) -> AppResult<Booking>;

    /// Aplica un cambio de estado/pago. Devolver una reserva liberada a un estado
    /// admitido repite la búsqueda de conflictos en el mismo paso atómico.
    async fn update(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking>;

    /// Una reserva `confirmed` o `active` de `user_id` sobre `car_id`
    async fn find_active_for_user_and_car(
        &self,
        user_id: Uuid,
        car_id: Uuid,
    ) -> AppResult<Option<Booking>>;

    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> AppResult<()>;
}

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bloquea la fila del coche para que sus admisiones vayan de una en una.
    /// Devuelve el flag `available` de la fila leído bajo el bloqueo.
    async fn lock_car(tx: &mut Transaction<'_, Postgres>, car_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT available FROM cars WHERE id = $1 FOR UPDATE")
            .bind(car_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| not_found_error("Car"))
    }

    /// Reservas admitidas del coche cuyas fechas cortan la ventana
    async fn candidates(
        tx: &mut Transaction<'_, Postgres>,
        car_id: Uuid,
        window: &BookingWindow,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE car_id = $1
              AND status IN ('pending', 'confirmed', 'active')
              AND start_date <= $2
              AND end_date >= $3
            "#,
        )
        .bind(car_id)
        .bind(window.end.date())
        .bind(window.start.date())
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows)
    }
}

/// La restricción de exclusión (SQLSTATE 23P01) se devuelve como conflicto de reserva.
fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23P01") {
            return AppError::Conflict(CONFLICT_MESSAGE.to_string());
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list(&self, query: &BookingQuery) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::uuid IS NULL OR car_id = $2)
              AND ($3::booking_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.user_id)
        .bind(query.car_id)
        .bind(query.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    async fn create_admitted(&self, draft: BookingDraft) -> AppResult<Booking> {
        let window = draft.window();
        let mut tx = self.pool.begin().await?;

        if !Self::lock_car(&mut tx, draft.car_id).await? {
            return Err(AppError::Unavailable(UNAVAILABLE_MESSAGE.to_string()));
        }
        let existing = Self::candidates(&mut tx, draft.car_id, &window).await?;
        booking_engine::ensure_no_conflict(draft.car_id, &window, &existing, None)?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, user_id, car_id, start_date, end_date, start_time, end_time,
                booking_type, total_hours, total_days, total_price, status, payment_status,
                pickup_location, dropoff_location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', 'pending', $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.user_id)
        .bind(draft.car_id)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(draft.booking_type)
        .bind(draft.total_hours)
        .bind(draft.total_days)
        .bind(draft.total_price)
        .bind(draft.pickup_location.map(Json))
        .bind(draft.dropoff_location.map(Json))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;

        tracing::info!(
            "Booking {} admitted for car {} ({} -> {})",
            booking.id,
            booking.car_id,
            window.start,
            window.end
        );
        Ok(booking)
    }

    async fn update(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Booking"))?;

        let readmitted = changes
            .status
            .map_or(false, |next| next.is_admitted() && !current.status.is_admitted());
        if readmitted {
            let window = current.window();
            Self::lock_car(&mut tx, current.car_id).await?;
            let existing = Self::candidates(&mut tx, current.car_id, &window).await?;
            booking_engine::ensure_no_conflict(current.car_id, &window, &existing, Some(id))?;
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.status)
        .bind(changes.payment_status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn find_active_for_user_and_car(
        &self,
        user_id: Uuid,
        car_id: Uuid,
    ) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1 AND car_id = $2 AND status IN ('confirmed', 'active')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE bookings SET payment_intent_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(payment_intent_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Booking"));
        }
        Ok(())
    }
}
