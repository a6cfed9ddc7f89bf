//! Utilidades de validación
//!
//! Validadores propios usados por los derives de `validator` en los DTOs,
//! los parsers de fecha/hora del flujo de reservas y los extractores cuyos
//! rechazos se devuelven como cuerpos JSON de `AppError`.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::geo::GeoPoint;
use crate::utils::errors::{validation_error, AppError, AppResult};

lazy_static! {
    pub static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    pub static ref TIME_RE: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
}

/// Cuerpo JSON que ya pasó sus reglas de `validator`
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Cuerpo JSON sin aplicar las reglas de `validator`
///
/// Para handlers que deben autorizar al usuario antes de validar.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// Query string; si está mal formada es un `BadRequest`
#[derive(Debug, Clone)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(AppQuery(value))
    }
}

/// Parámetros de ruta; un id que no se puede parsear no nombra ningún recurso, así que `NotFound`
#[derive(Debug, Clone)]
pub struct AppPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(AppPath(value))
    }
}

/// Envuelve un `ValidationError` de campo en un `AppError`
pub fn field_error(field: &'static str, error: ValidationError) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    AppError::Validation(errors)
}

/// Parsea un `YYYY-MM-DD` que ya pasó la comprobación de formato.
pub fn parse_date(field: &'static str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| validation_error(field, "must be a calendar date in YYYY-MM-DD format"))
}

/// Parsea un `HH:MM` que ya pasó la comprobación de formato.
pub fn parse_time(field: &'static str, value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| validation_error(field, "must be a time of day in HH:MM format"))
}

/// Coordenadas GPS dentro de los límites WGS84
pub fn validate_coordinates(point: &GeoPoint) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&point.lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &point.lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }

    if !(-180.0..=180.0).contains(&point.lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &point.lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }

    Ok(())
}

/// Valor estrictamente positivo (precios, importes de pago)
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: &T,
) -> Result<(), ValidationError> {
    if *value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}

/// Año del modelo entre 1900 y el año que viene
pub fn validate_model_year(year: i32) -> Result<(), ValidationError> {
    let max = Utc::now().year() + 1;
    if !(1900..=max).contains(&year) {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &1900);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &year);
        return Err(error);
    }
    Ok(())
}

/// Cada imagen debe ser una URL absoluta
pub fn validate_image_urls(images: &Vec<String>) -> Result<(), ValidationError> {
    if let Some(bad) = images.iter().find(|url| !validator::validate_url(url.as_str())) {
        let mut error = ValidationError::new("url");
        error.add_param("value".into(), bad);
        return Err(error);
    }
    Ok(())
}
