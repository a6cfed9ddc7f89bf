//! Middleware
//!
//! Extractores de sesión, CORS y filtro de páginas.

pub mod auth;
pub mod cors;
pub mod page_gate;

pub use auth::{MaybeAuth, ACCESS_TOKEN_COOKIE};
pub use cors::cors_layer;
pub use page_gate::page_gate;
