//! Configuración del proyecto
//!
//! Variables de entorno, pool de base de datos y credenciales de las
//! integraciones externas.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
