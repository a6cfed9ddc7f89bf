//! Registro, login y consulta de sesión

use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::auth_dto::{LoginRequest, LoginResponse, MeResponse, SignupRequest, SignupResponse, SIGNUP_MESSAGE};
use crate::models::auth::AuthContext;
use crate::models::user::{NewUser, UserProfile, UserRole};
use crate::repositories::UserRepository;
use crate::services::jwt_service::JwtService;
use crate::services::password_service::{hash_password, verify_password};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    bcrypt_cost: u32,
    session_seconds: i64,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            jwt: state.jwt.clone(),
            bcrypt_cost: state.config.bcrypt_cost,
            session_seconds: state.config.jwt_expiration,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<SignupResponse> {
        let password_hash = hash_password(&request.password, self.bcrypt_cost).await?;

        let user = self
            .users
            .create(NewUser {
                email: request.email.trim().to_lowercase(),
                password_hash,
                full_name: request.full_name.trim().to_string(),
                phone: request.phone.filter(|p| !p.trim().is_empty()),
                role: UserRole::User,
            })
            .await?;

        info!("👤 New user registered: {}", user.id);

        Ok(SignupResponse {
            user: UserProfile::from(user),
            message: SIGNUP_MESSAGE.to_string(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = request.email.trim().to_lowercase();

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("🔒 Login attempt for unknown account");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
        };

        if !verify_password(&request.password, &user.password_hash).await? {
            warn!("🔒 Wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
        }

        let issued = self.jwt.generate_access_token(&user)?;
        info!("🔑 User {} logged in", user.id);

        Ok(LoginResponse {
            token: issued.token,
            user: UserProfile::from(user),
            expires_at: issued.expires_at,
        })
    }

    pub async fn me(&self, caller: &AuthContext) -> AppResult<MeResponse> {
        let user = self
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| not_found_error("User"))?;

        Ok(MeResponse {
            user: UserProfile::from(user),
        })
    }

    /// Duración de la sesión, usada para el `Max-Age` de la cookie
    pub fn session_seconds(&self) -> i64 {
        self.session_seconds
    }
}
