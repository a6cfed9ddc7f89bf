//! Estado compartido de la aplicación
//!
//! axum lo clona en cada handler. Contiene los repositorios, las pasarelas
//! externas y el servicio de tokens; nada en él es mutable.

use std::sync::Arc;

use reqwest::Client;

use crate::clients::{MailClient, StripeClient, TwilioClient};
use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    BookingRepository, CarRepository, Repositories, TrackingRepository, UserRepository,
};
use crate::services::jwt_service::{JwtConfig, JwtService};
use crate::services::notification_service::{NotificationChannel, NotificationDispatcher};
use crate::services::payment_service::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub users: Arc<dyn UserRepository>,
    pub cars: Arc<dyn CarRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub tracking: Arc<dyn TrackingRepository>,
    pub payments: Arc<dyn PaymentGateway>,
    pub notifications: NotificationDispatcher,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repositories: Repositories,
        payments: Arc<dyn PaymentGateway>,
        notifications: NotificationDispatcher,
    ) -> Self {
        let jwt = JwtService::new(JwtConfig::new(config.jwt_secret.clone(), config.jwt_expiration));

        Self {
            config: Arc::new(config),
            users: repositories.users,
            cars: repositories.cars,
            bookings: repositories.bookings,
            tracking: repositories.tracking,
            payments,
            notifications,
            jwt: Arc::new(jwt),
        }
    }

    /// Conecta Stripe, correo y SMS a partir de la configuración.
    pub fn with_integrations(config: EnvironmentConfig, repositories: Repositories, http: Client) -> Self {
        let payments: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(http.clone(), &config.stripe));

        let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
        if let Some(mail) = &config.mail {
            channels.push(Arc::new(MailClient::new(http.clone(), mail.clone())));
        }
        if let Some(sms) = &config.sms {
            channels.push(Arc::new(TwilioClient::new(http, sms.clone())));
        }

        Self::new(config, repositories, payments, NotificationDispatcher::new(channels))
    }
}
