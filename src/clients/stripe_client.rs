//! Cliente de Stripe PaymentIntents
//!
//! Habla directamente con la API REST con cuerpos form-encoded, el formato
//! que espera la API de Stripe.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::environment::StripeConfig;
use crate::services::payment_service::{PaymentGateway, PaymentIntent, PaymentIntentRequest};
use crate::utils::errors::{AppError, AppResult};

pub const NOT_CONFIGURED_MESSAGE: &str = "Stripe is not configured";

pub struct StripeClient {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: Option<String>,
}

impl StripeClient {
    pub fn new(client: Client, config: &StripeConfig) -> Self {
        Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    fn form(request: &PaymentIntentRequest) -> Vec<(&'static str, String)> {
        vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("metadata[booking_id]", request.booking_id.to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> AppResult<PaymentIntent> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalApi(NOT_CONFIGURED_MESSAGE.to_string()))?;

        tracing::info!(
            "💳 Creating payment intent for booking {} ({} {})",
            request.booking_id,
            request.amount,
            request.currency
        );

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(secret_key)
            .form(&Self::form(request))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to create payment intent: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Stripe responded {}: {}", status, body);
            return Err(AppError::ExternalApi("Failed to create payment intent".to_string()));
        }

        let intent: PaymentIntentResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Invalid payment intent response: {}", e)))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret.unwrap_or_default(),
        })
    }
}
