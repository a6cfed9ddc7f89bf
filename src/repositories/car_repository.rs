use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::booking::BookingType;
use crate::models::car::{Car, CarQuery, NewCar};
use crate::utils::errors::{AppError, AppResult};

pub const CAR_IN_USE_MESSAGE: &str = "Car has bookings or tracking history and cannot be deleted";

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Coches que cumplen los filtros, los más recientes primero
    async fn list(&self, query: &CarQuery) -> AppResult<Vec<Car>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>>;
    async fn create(&self, car: NewCar) -> AppResult<Car>;
    /// Guarda todas las columnas mutables de `car`; `None` si ya no existe
    async fn update(&self, car: &Car) -> AppResult<Option<Car>>;
    /// `false` si no se borró nada. Los coches referenciados por reservas o
    /// muestras de tracking se rechazan con `BadRequest`.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn list(&self, query: &CarQuery) -> AppResult<Vec<Car>> {
        let price_column = match query.price_basis {
            BookingType::Hourly => "hourly_price",
            BookingType::Daily => "daily_price",
        };

        let sql = format!(
            r#"
            SELECT * FROM cars
            WHERE ($1::car_type IS NULL OR type = $1)
              AND ($2::transmission IS NULL OR transmission = $2)
              AND ($3::fuel_type IS NULL OR fuel_type = $3)
              AND ($4::boolean IS NULL OR available = $4)
              AND ($5::numeric IS NULL OR {price_column} >= $5)
              AND ($6::numeric IS NULL OR {price_column} <= $6)
              AND ($7::text IS NULL OR make ILIKE $7 OR model ILIKE $7 OR description ILIKE $7)
            ORDER BY created_at DESC
            "#
        );

        let cars = sqlx::query_as::<_, Car>(&sql)
            .bind(query.car_type)
            .bind(query.transmission)
            .bind(query.fuel_type)
            .bind(query.available)
            .bind(query.min_price)
            .bind(query.max_price)
            .bind(query.search.as_ref().map(|term| format!("%{}%", term)))
            .fetch_all(&self.pool)
            .await?;

        Ok(cars)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    async fn create(&self, car: NewCar) -> AppResult<Car> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (
                id, make, model, year, color, license_plate, type, seats, transmission,
                fuel_type, mileage, hourly_price, daily_price, images, description,
                available, location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(car.make)
        .bind(car.model)
        .bind(car.year)
        .bind(car.color)
        .bind(car.license_plate)
        .bind(car.car_type)
        .bind(car.seats)
        .bind(car.transmission)
        .bind(car.fuel_type)
        .bind(car.mileage)
        .bind(car.hourly_price)
        .bind(car.daily_price)
        .bind(car.images)
        .bind(car.description)
        .bind(car.available)
        .bind(car.location.map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(car)
    }

    async fn update(&self, car: &Car) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $2, model = $3, year = $4, color = $5, license_plate = $6, type = $7,
                seats = $8, transmission = $9, fuel_type = $10, mileage = $11,
                hourly_price = $12, daily_price = $13, images = $14, description = $15,
                available = $16, location = $17, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(&car.color)
        .bind(&car.license_plate)
        .bind(car.car_type)
        .bind(car.seats)
        .bind(car.transmission)
        .bind(car.fuel_type)
        .bind(car.mileage)
        .bind(car.hourly_price)
        .bind(car.daily_price)
        .bind(&car.images)
        .bind(&car.description)
        .bind(car.available)
        .bind(&car.location)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return AppError::BadRequest(CAR_IN_USE_MESSAGE.to_string());
                    }
                }
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
