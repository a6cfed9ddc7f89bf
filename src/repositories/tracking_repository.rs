use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tracking::{NewTrackingSample, Tracking, TrackingQuery};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Muestras dentro del alcance, más recientes primero, como mucho `query.limit`
    async fn list(&self, query: &TrackingQuery) -> AppResult<Vec<Tracking>>;
    async fn append(&self, sample: NewTrackingSample) -> AppResult<Tracking>;
}

pub struct PgTrackingRepository {
    pool: PgPool,
}

impl PgTrackingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackingRepository for PgTrackingRepository {
    async fn list(&self, query: &TrackingQuery) -> AppResult<Vec<Tracking>> {
        let samples = sqlx::query_as::<_, Tracking>(
            r#"
            SELECT t.* FROM tracking t
            WHERE ($1::uuid IS NULL OR t.booking_id = $1)
              AND ($2::uuid IS NULL OR t.car_id = $2)
              AND ($3::uuid IS NULL OR t.booking_id IN (SELECT id FROM bookings WHERE user_id = $3))
            ORDER BY t.timestamp DESC
            LIMIT $4
            "#,
        )
        .bind(query.booking_id)
        .bind(query.car_id)
        .bind(query.owner_id)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    async fn append(&self, sample: NewTrackingSample) -> AppResult<Tracking> {
        let tracking = sqlx::query_as::<_, Tracking>(
            r#"
            INSERT INTO tracking (id, car_id, booking_id, latitude, longitude, speed, heading)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sample.car_id)
        .bind(sample.booking_id)
        .bind(sample.latitude)
        .bind(sample.longitude)
        .bind(sample.speed)
        .bind(sample.heading)
        .fetch_one(&self.pool)
        .await?;

        Ok(tracking)
    }
}
