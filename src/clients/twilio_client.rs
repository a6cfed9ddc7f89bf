//! Cliente SMS de Twilio (Messages REST API)

use async_trait::async_trait;
use reqwest::Client;

use crate::config::environment::SmsConfig;
use crate::services::notification_service::{BookingNotice, Delivery, NotificationChannel};
use crate::utils::errors::{AppError, AppResult};

pub struct TwilioClient {
    client: Client,
    config: SmsConfig,
}

impl TwilioClient {
    pub fn new(client: Client, config: SmsConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> AppResult<()> {
        let form = [("To", to), ("From", self.config.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Twilio unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!("Twilio responded {}: {}", status, body)));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TwilioClient {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn deliver(&self, notice: &BookingNotice) -> AppResult<Delivery> {
        let Some(phone) = notice.phone.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(Delivery::Skipped("no phone number"));
        };

        self.send_sms(phone, &notice.sms_body()).await?;
        Ok(Delivery::Sent)
    }
}
