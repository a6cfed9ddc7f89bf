use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::controllers::tracking_controller::TrackingController;
use crate::dto::tracking_dto::{CreateTrackingRequest, TrackingListQuery, TrackingListResponse, TrackingResponse};
use crate::models::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{AppQuery, ValidatedJson};

pub fn create_tracking_router() -> Router<AppState> {
    Router::new().route("/", get(list_tracking).post(record_tracking))
}

async fn list_tracking(
    State(state): State<AppState>,
    caller: AuthContext,
    AppQuery(query): AppQuery<TrackingListQuery>,
) -> Result<Json<TrackingListResponse>, AppError> {
    let controller = TrackingController::new(&state);
    let response = controller.list(&caller, query).await?;
    Ok(Json(response))
}

async fn record_tracking(
    State(state): State<AppState>,
    caller: AuthContext,
    ValidatedJson(request): ValidatedJson<CreateTrackingRequest>,
) -> Result<(StatusCode, Json<TrackingResponse>), AppError> {
    let controller = TrackingController::new(&state);
    let response = controller.record(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
