use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::utils::errors::{validation_error, AppResult};

/// Payment intent a abrir en la pasarela
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    /// Importe en unidades menores (céntimos)
    pub amount: i64,
    /// Código ISO de moneda en minúsculas
    pub currency: String,
    pub booking_id: Uuid,
    pub user_id: Uuid,
}

impl PaymentIntentRequest {
    pub fn new(amount: Decimal, currency: &str, booking_id: Uuid, user_id: Uuid) -> AppResult<Self> {
        Ok(Self {
            amount: to_minor_units(amount)?,
            currency: currency.trim().to_lowercase(),
            booking_id,
            user_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> AppResult<PaymentIntent>;
}

/// `round(amount × 100)`, redondeo half away from zero
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| validation_error("amount", "amount is out of range"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| validation_error("amount", "amount is out of range"))
}
