//! Extracción de la sesión
//!
//! El token de sesión se lee de `Authorization: Bearer <token>` o de la
//! cookie `access_token`, se verifica y se cruza con la fila de `users`. Los
//! handlers piden `AuthContext` cuando hace falta un usuario y `MaybeAuth`
//! cuando la ruta también admite anónimos.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::{
    models::auth::AuthContext,
    state::AppState,
    utils::errors::{unauthenticated_error, AppError},
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Valor de una cookie de los headers `Cookie`
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Primero el Bearer token, después la cookie de sesión
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| cookie_value(headers, ACCESS_TOKEN_COOKIE).filter(|token| !token.is_empty()))
}

async fn resolve(state: &AppState, token: &str) -> Result<AuthContext, AppError> {
    let user_id = state.jwt.user_id(token)?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(unauthenticated_error)?;

    Ok(AuthContext::from(&user))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(unauthenticated_error)?;
        resolve(state, token).await
    }
}

/// Usuario si hay una sesión válida, anónimo si no
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeAuth(None));
        };

        match resolve(state, token).await {
            Ok(caller) => Ok(MaybeAuth(Some(caller))),
            Err(AppError::Database(e)) => Err(AppError::Database(e)),
            Err(e) => {
                tracing::debug!("Ignoring invalid session: {}", e);
                Ok(MaybeAuth(None))
            }
        }
    }
}
