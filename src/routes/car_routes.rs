use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::booking_dto::MessageResponse;
use crate::dto::car_dto::{CarListQuery, CarResponse, CarsResponse, CreateCarRequest, UpdateCarRequest};
use crate::middleware::MaybeAuth;
use crate::models::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{AppJson, AppPath, AppQuery};

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
}

async fn list_cars(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
    AppQuery(query): AppQuery<CarListQuery>,
) -> Result<Json<CarsResponse>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.list(caller.as_ref(), query).await?;
    Ok(Json(response))
}

async fn get_car(
    State(state): State<AppState>,
    MaybeAuth(caller): MaybeAuth,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.get(caller.as_ref(), id).await?;
    Ok(Json(response))
}

async fn create_car(
    State(state): State<AppState>,
    caller: AuthContext,
    AppJson(request): AppJson<CreateCarRequest>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    let controller = CarController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_car(
    State(state): State<AppState>,
    caller: AuthContext,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateCarRequest>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.update(&caller, id, request).await?;
    Ok(Json(response))
}

async fn delete_car(
    State(state): State<AppState>,
    caller: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let controller = CarController::new(&state);
    let response = controller.delete(&caller, id).await?;
    Ok(Json(response))
}
