//! Utilidades compartidas: tipo de error y validación de peticiones

pub mod errors;
pub mod validation;
