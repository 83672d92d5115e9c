use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{CreatePaymentIntentDto, PaymentIntentResponse};

use crate::middleware::role::CurrentIdentity;
use crate::modules::payments::service::PaymentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = CreatePaymentIntentDto,
    responses(
        (status = 200, description = "Payment intent created", body = PaymentIntentResponse),
        (status = 400, description = "Malformed body or free course"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only"),
        (status = 404, description = "Course not found or not approved"),
        (status = 500, description = "Payment processor failure")
    ),
    tag = "Payments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    CurrentIdentity(_student): CurrentIdentity,
    ValidatedJson(dto): ValidatedJson<CreatePaymentIntentDto>,
) -> Result<ApiResponse<PaymentIntentResponse>, AppError> {
    let intent = PaymentService::create_payment_intent(
        state.store.as_ref(),
        state.payments.as_ref(),
        &state.payment_config.currency,
        dto,
    )
    .await?;

    Ok(ApiResponse::ok("Payment intent created", intent))
}
