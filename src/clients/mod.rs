//! Clientes - clientes HTTP para APIs externas
//!
//! Pasarela de pago, API de correo y proveedor SMS. Todos comparten un
//! `reqwest::Client` creado al arrancar.

pub mod mail_client;
pub mod stripe_client;
pub mod twilio_client;

pub use mail_client::MailClient;
pub use stripe_client::StripeClient;
pub use twilio_client::TwilioClient;
