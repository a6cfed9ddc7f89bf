use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::MessageResponse;
use crate::dto::car_dto::{CarListQuery, CarResponse, CarsResponse, CreateCarRequest, UpdateCarRequest};
use crate::models::auth::AuthContext;
use crate::models::car::{Car, CarChanges, NewCar};
use crate::repositories::CarRepository;
use crate::services::authorization_service::{authorize, Action, Resource};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::{field_error, validate_model_year};

pub const CAR_DELETED_MESSAGE: &str = "Car deleted successfully";

pub struct CarController {
    cars: Arc<dyn CarRepository>,
}

impl CarController {
    pub fn new(state: &AppState) -> Self {
        Self {
            cars: state.cars.clone(),
        }
    }

    /// Listado público del catálogo
    pub async fn list(&self, caller: Option<&AuthContext>, query: CarListQuery) -> AppResult<CarsResponse> {
        authorize(caller, Resource::Fleet, Action::Read).into_result()?;

        let cars = self.cars.list(&query.into()).await?;
        Ok(CarsResponse { cars })
    }

    pub async fn get(&self, caller: Option<&AuthContext>, id: Uuid) -> AppResult<CarResponse> {
        authorize(caller, Resource::Fleet, Action::Read).into_result()?;

        let car = self.find(id).await?;
        Ok(CarResponse { car })
    }

    pub async fn create(&self, caller: &AuthContext, request: CreateCarRequest) -> AppResult<CarResponse> {
        authorize(Some(caller), Resource::Fleet, Action::Create).into_result()?;

        request.validate()?;
        validate_model_year(request.year).map_err(|e| field_error("year", e))?;

        let car = self.cars.create(NewCar::from(request)).await?;
        info!("🚗 Car {} added to the fleet by {}", car.id, caller.user_id);

        Ok(CarResponse { car })
    }

    pub async fn update(&self, caller: &AuthContext, id: Uuid, request: UpdateCarRequest) -> AppResult<CarResponse> {
        authorize(Some(caller), Resource::Fleet, Action::Update).into_result()?;

        request.validate()?;
        if let Some(year) = request.year {
            validate_model_year(year).map_err(|e| field_error("year", e))?;
        }

        let mut car = self.find(id).await?;
        car.apply(CarChanges::from(request));

        let car = self
            .cars
            .update(&car)
            .await?
            .ok_or_else(|| not_found_error("Car"))?;

        info!("🚗 Car {} updated by {}", car.id, caller.user_id);
        Ok(CarResponse { car })
    }

    pub async fn delete(&self, caller: &AuthContext, id: Uuid) -> AppResult<MessageResponse> {
        authorize(Some(caller), Resource::Fleet, Action::Delete).into_result()?;

        if !self.cars.delete(id).await? {
            return Err(not_found_error("Car"));
        }

        info!("🗑️ Car {} removed by {}", id, caller.user_id);
        Ok(MessageResponse::new(CAR_DELETED_MESSAGE))
    }

    async fn find(&self, id: Uuid) -> AppResult<Car> {
        self.cars.find_by_id(id).await?.ok_or_else(|| not_found_error("Car"))
    }
}
