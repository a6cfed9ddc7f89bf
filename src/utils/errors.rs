//! Manejo de errores
//!
//! Todo fallo que puede producir un handler es un `AppError`. El impl de
//! `IntoResponse` es el único sitio donde los errores se convierten en códigos
//! HTTP y en el cuerpo JSON `{ error, code, details? }`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

/// Cuerpo de error que devuelve la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// Los diagnósticos internos solo se exponen en builds de debug.
fn diagnostics(value: serde_json::Value) -> Option<serde_json::Value> {
    if cfg!(debug_assertions) {
        Some(value)
    } else {
        None
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::Conflict(_)
            | AppError::Unavailable(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Internal(_)
            | AppError::Hash(_)
            | AppError::ExternalApi(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse {
                    error: "An error occurred while accessing the database".to_string(),
                    code: "DB_ERROR",
                    details: diagnostics(json!({ "sql_error": e.to_string() })),
                }
            }

            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                ErrorResponse {
                    error: "Invalid input".to_string(),
                    code: "VALIDATION_ERROR",
                    details: Some(json!(e)),
                }
            }

            AppError::Unauthorized(msg) => {
                tracing::debug!("Unauthorized access: {}", msg);
                ErrorResponse {
                    error: msg,
                    code: "UNAUTHORIZED",
                    details: None,
                }
            }

            AppError::Forbidden(msg) => {
                tracing::info!("Forbidden access: {}", msg);
                ErrorResponse {
                    error: msg,
                    code: "FORBIDDEN",
                    details: None,
                }
            }

            AppError::NotFound(msg) => ErrorResponse {
                error: msg,
                code: "NOT_FOUND",
                details: None,
            },

            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                ErrorResponse {
                    error: msg,
                    code: "CONFLICT",
                    details: None,
                }
            }

            AppError::Unavailable(msg) => ErrorResponse {
                error: msg,
                code: "UNAVAILABLE",
                details: None,
            },

            AppError::BadRequest(msg) => ErrorResponse {
                error: msg,
                code: "BAD_REQUEST",
                details: None,
            },

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    code: "INTERNAL_ERROR",
                    details: diagnostics(json!({ "internal_error": msg })),
                }
            }

            AppError::Jwt(msg) => {
                tracing::debug!("JWT error: {}", msg);
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    code: "JWT_ERROR",
                    details: diagnostics(json!({ "jwt_error": msg })),
                }
            }

            AppError::Hash(msg) => {
                tracing::error!("Hash error: {}", msg);
                ErrorResponse {
                    error: "An error occurred while processing credentials".to_string(),
                    code: "HASH_ERROR",
                    details: diagnostics(json!({ "hash_error": msg })),
                }
            }

            AppError::ExternalApi(msg) => {
                tracing::error!("External API error: {}", msg);
                ErrorResponse {
                    error: msg,
                    code: "EXTERNAL_API_ERROR",
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid input: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::NotFound(format!("Resource not found: {}", rejection.body_text()))
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Construye un error de validación de un solo campo
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

pub fn not_found_error(resource: &str) -> AppError {
    AppError::NotFound(format!("{} not found", resource))
}

pub fn forbidden_error(reason: &str) -> AppError {
    AppError::Forbidden(reason.to_string())
}

pub fn unauthenticated_error() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}
