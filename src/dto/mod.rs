//! DTOs de request y response de la API HTTP

pub mod auth_dto;
pub mod booking_dto;
pub mod car_dto;
pub mod payment_dto;
pub mod tracking_dto;
