use std::sync::Arc;

use tracing::info;

use crate::dto::payment_dto::{CreateIntentRequest, CreateIntentResponse};
use crate::models::auth::AuthContext;
use crate::repositories::BookingRepository;
use crate::services::authorization_service::{authorize, Action, Resource};
use crate::services::payment_service::{PaymentGateway, PaymentIntentRequest};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PaymentController {
    bookings: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            bookings: state.bookings.clone(),
            gateway: state.payments.clone(),
        }
    }

    /// Abre un payment intent para la reserva y guarda su id
    pub async fn create_intent(&self, caller: &AuthContext, request: CreateIntentRequest) -> AppResult<CreateIntentResponse> {
        let booking = self
            .bookings
            .find_by_id(request.booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking"))?;
        authorize(Some(caller), Resource::Payment(&booking), Action::Create).into_result()?;

        let intent_request = PaymentIntentRequest::new(request.amount, &request.currency, booking.id, caller.user_id)?;
        let intent = self.gateway.create_payment_intent(&intent_request).await?;

        self.bookings.set_payment_intent(booking.id, &intent.id).await?;
        info!(
            "💳 Payment intent {} opened for booking {} ({} {})",
            intent.id, booking.id, intent_request.amount, intent_request.currency
        );

        Ok(CreateIntentResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
        })
    }
}
