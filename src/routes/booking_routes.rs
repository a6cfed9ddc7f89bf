use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, BookingsResponse, CreateBookingRequest, MessageResponse,
    UpdateBookingRequest,
};
use crate::models::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{AppPath, AppQuery, ValidatedJson};

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/:id", get(get_booking).put(update_booking).delete(cancel_booking))
}

async fn list_bookings(
    State(state): State<AppState>,
    caller: AuthContext,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let controller = BookingController::new(&state);
    let response = controller.list(&caller, query).await?;
    Ok(Json(response))
}

async fn create_booking(
    State(state): State<AppState>,
    caller: AuthContext,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let controller = BookingController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_booking(
    State(state): State<AppState>,
    caller: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(&state);
    let response = controller.get(&caller, id).await?;
    Ok(Json(response))
}

async fn update_booking(
    State(state): State<AppState>,
    caller: AuthContext,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(&state);
    let response = controller.update(&caller, id, request).await?;
    Ok(Json(response))
}

async fn cancel_booking(
    State(state): State<AppState>,
    caller: AuthContext,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let controller = BookingController::new(&state);
    let response = controller.cancel(&caller, id).await?;
    Ok(Json(response))
}
