use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{complete_payment, list_enrollments};

/// Mount behind `require_student`.
pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/enroll-class", get(list_enrollments))
        .route("/payment-class", post(complete_payment))
}
