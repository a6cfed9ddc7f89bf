use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{LoginRequest, MeResponse, SignupRequest, SignupResponse};
use crate::dto::booking_dto::MessageResponse;
use crate::middleware::ACCESS_TOKEN_COOKIE;
use crate::models::auth::AuthContext;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

pub const LOGGED_OUT_MESSAGE: &str = "Logged out successfully";

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Valor de `Set-Cookie` para la cookie de sesión
pub fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        ACCESS_TOKEN_COOKIE,
        token,
        max_age.max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let controller = AuthController::new(&state);
    let response = controller.signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.login(request).await?;
    let cookie = session_cookie(
        &response.token,
        controller.session_seconds(),
        state.config.is_production(),
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = session_cookie("", 0, state.config.is_production());
    ([(header::SET_COOKIE, cookie)], Json(MessageResponse::new(LOGGED_OUT_MESSAGE)))
}

async fn me(State(state): State<AppState>, caller: AuthContext) -> Result<Json<MeResponse>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.me(&caller).await?;
    Ok(Json(response))
}
