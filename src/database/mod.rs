//! Módulo de base de datos
//!
//! Pool de conexiones y migraciones para PostgreSQL.

pub mod connection;

pub use connection::{connect, run_migrations};
