//! Modelos de datos
//!
//! Structs que mapean el esquema PostgreSQL de `migrations/`, más las
//! formas de insert/update/filtro que aceptan los repositorios.

pub mod auth;
pub mod booking;
pub mod car;
pub mod geo;
pub mod tracking;
pub mod user;
