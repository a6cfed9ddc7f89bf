//! Cliente de la API HTTP de correo
//!
//! Envía correo HTML por un endpoint `v3/mail/send` compatible con SendGrid.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::environment::MailConfig;
use crate::services::notification_service::{BookingNotice, Delivery, NotificationChannel, EMAIL_SUBJECT};
use crate::utils::errors::{AppError, AppResult};

pub struct MailClient {
    client: Client,
    config: MailConfig,
}

impl MailClient {
    pub fn new(client: Client, config: MailConfig) -> Self {
        Self { client, config }
    }

    pub async fn send_html(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.config.from },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Mail API unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!("Mail API responded {}: {}", status, body)));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for MailClient {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, notice: &BookingNotice) -> AppResult<Delivery> {
        if notice.email.trim().is_empty() {
            return Ok(Delivery::Skipped("no email address"));
        }

        self.send_html(&notice.email, EMAIL_SUBJECT, &notice.email_html()).await?;
        Ok(Delivery::Sent)
    }
}
