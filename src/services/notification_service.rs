//! Notificaciones de reservas
//!
//! Tras confirmar una reserva en base de datos, la confirmación se envía a
//! cada canal configurado (email, SMS) en una tarea aparte. El envío es
//! best effort: los fallos se registran y se recogen en un `DeliveryReport`,
//! nunca llegan a la petición que creó la reserva.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::auth::AuthContext;
use crate::models::booking::{Booking, BookingType};
use crate::models::car::Car;
use crate::utils::errors::AppResult;

pub const EMAIL_SUBJECT: &str = "Booking Confirmation - Car Rental";

/// Todo lo que necesita un mensaje de confirmación, separado de la petición
#[derive(Debug, Clone, PartialEq)]
pub struct BookingNotice {
    pub booking_id: Uuid,
    pub recipient_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub vehicle: String,
    pub vehicle_with_year: String,
    pub booking_type: BookingType,
    pub duration: String,
    pub starts: String,
    pub ends: String,
    pub total_price: Decimal,
}

impl BookingNotice {
    pub fn new(booking: &Booking, car: &Car, customer: &AuthContext) -> Self {
        let window = booking.window();
        Self {
            booking_id: booking.id,
            recipient_name: customer.full_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            vehicle: format!("{} {}", car.make, car.model),
            vehicle_with_year: car.display_name(),
            booking_type: booking.booking_type,
            duration: booking.duration_label(),
            starts: window.start.format("%Y-%m-%d %H:%M").to_string(),
            ends: window.end.format("%Y-%m-%d %H:%M").to_string(),
            total_price: booking.total_price,
        }
    }

    /// Primeros 8 caracteres del id de reserva
    pub fn short_id(&self) -> String {
        self.booking_id.to_string()[..8].to_string()
    }

    fn total(&self) -> String {
        format!("${:.2}", self.total_price.round_dp(2))
    }

    fn rental_type(&self) -> &'static str {
        match self.booking_type {
            BookingType::Hourly => "Hourly",
            BookingType::Daily => "Daily",
        }
    }

    pub fn email_html(&self) -> String {
        let name = if self.recipient_name.trim().is_empty() {
            "Valued Customer"
        } else {
            self.recipient_name.as_str()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background: #667eea; color: white; padding: 20px; text-align: center; }}
    .details {{ background: white; padding: 15px; margin: 10px 0; border-radius: 5px; }}
    .total {{ font-size: 24px; font-weight: bold; color: #667eea; }}
    .footer {{ text-align: center; padding: 20px; color: #666; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1>Booking Confirmed!</h1></div>
    <p>Dear {name},</p>
    <p>Your booking has been confirmed. Here are your booking details:</p>
    <div class="details">
      <h3>Booking Information</h3>
      <p><strong>Booking ID:</strong> {short_id}</p>
      <p><strong>Vehicle:</strong> {vehicle}</p>
      <p><strong>Rental Type:</strong> {rental_type}</p>
      <p><strong>Duration:</strong> {duration}</p>
      <p><strong>Start Date &amp; Time:</strong> {starts}</p>
      <p><strong>End Date &amp; Time:</strong> {ends}</p>
      <p><strong>Total Amount:</strong> <span class="total">{total}</span></p>
    </div>
    <p>Thank you for choosing our car rental service. If you have any questions, please contact our support team.</p>
    <div class="footer"><p>This is an automated message. Please do not reply to this email.</p></div>
  </div>
</body>
</html>"#,
            name = name,
            short_id = self.short_id(),
            vehicle = self.vehicle_with_year,
            rental_type = self.rental_type(),
            duration = self.duration,
            starts = self.starts,
            ends = self.ends,
            total = self.total(),
        )
    }

    pub fn sms_body(&self) -> String {
        format!(
            "Booking Confirmed!\n\n\
             Booking ID: {}\n\
             Vehicle: {}\n\
             Duration: {}\n\
             Total: {}\n\n\
             Start: {}\n\
             End: {}\n\n\
             Thank you for choosing our service!",
            self.short_id(),
            self.vehicle,
            self.duration,
            self.total(),
            self.starts,
            self.ends,
        )
    }
}

/// Resultado de un canal
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Sent,
    /// El canal no tenía nada que hacer (faltan datos del destinatario)
    Skipped(&'static str),
}

/// Transporte capaz de entregar una confirmación de reserva
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, notice: &BookingNotice) -> AppResult<Delivery>;
}

/// Resultados por canal de un envío
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<(&'static str, Result<Delivery, String>)>,
}

impl DeliveryReport {
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Ok(Delivery::Sent)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.outcomes.iter().filter_map(|(channel, outcome)| match outcome {
            Err(e) => Some((*channel, e.as_str())),
            Ok(_) => None,
        })
    }
}

/// Reparte un aviso entre todos los canales registrados
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Entrega en todos los canales a la vez y espera cada resultado.
    pub async fn dispatch(&self, notice: &BookingNotice) -> DeliveryReport {
        let deliveries = self.channels.iter().map(|channel| async move {
            let outcome = channel.deliver(notice).await.map_err(|e| e.to_string());
            match &outcome {
                Ok(Delivery::Sent) => {
                    tracing::info!("📨 {} confirmation sent for booking {}", channel.name(), notice.short_id())
                }
                Ok(Delivery::Skipped(reason)) => {
                    tracing::debug!("{} confirmation skipped: {}", channel.name(), reason)
                }
                Err(e) => tracing::warn!(
                    "⚠️ {} confirmation failed for booking {}: {}",
                    channel.name(),
                    notice.booking_id,
                    e
                ),
            }
            (channel.name(), outcome)
        });

        DeliveryReport {
            outcomes: join_all(deliveries).await,
        }
    }

    /// Ejecuta `dispatch` en su propia tarea; quien llama no lo espera.
    pub fn spawn(&self, notice: BookingNotice) -> JoinHandle<DeliveryReport> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(&notice).await })
    }
}
