//! Servicios
//!
//! Reglas de negocio que no pertenecen a una sola ruta: admisión y precio
//! de reservas, política de autorización, visibilidad del tracking,
//! sesiones, contraseñas, pagos y notificaciones.

pub mod authorization_service;
pub mod booking_engine;
pub mod jwt_service;
pub mod notification_service;
pub mod password_service;
pub mod payment_service;
pub mod tracking_service;
