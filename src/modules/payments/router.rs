use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::create_payment_intent;

/// Mount behind `require_student`.
pub fn init_payments_router() -> Router<AppState> {
    Router::new().route("/create-payment-intent", post(create_payment_intent))
}
