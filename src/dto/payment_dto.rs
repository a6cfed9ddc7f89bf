use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_positive;

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIntentRequest {
    pub booking_id: Uuid,
    #[validate(custom = "validate_positive")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    pub payment_intent_id: String,
}
