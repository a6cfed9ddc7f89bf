use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::payment_controller::PaymentController;
use crate::dto::payment_dto::{CreateIntentRequest, CreateIntentResponse};
use crate::models::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

pub fn create_payment_router() -> Router<AppState> {
    Router::new().route("/create-intent", post(create_intent))
}

async fn create_intent(
    State(state): State<AppState>,
    caller: AuthContext,
    ValidatedJson(request): ValidatedJson<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, AppError> {
    let controller = PaymentController::new(&state);
    let response = controller.create_intent(&caller, request).await?;
    Ok(Json(response))
}
