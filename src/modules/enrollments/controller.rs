use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{CompletePaymentDto, EnrollmentReceipt, EnrollmentRecord};

use crate::middleware::role::CurrentIdentity;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/enroll-class",
    responses(
        (status = 200, description = "The caller's enrollments, newest first", body = Vec<EnrollmentRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_enrollments(
    State(state): State<AppState>,
    CurrentIdentity(student): CurrentIdentity,
) -> Result<ApiResponse<Vec<EnrollmentRecord>>, AppError> {
    let enrollments =
        EnrollmentService::list_enrollments(state.store.as_ref(), &student.email).await?;

    Ok(ApiResponse::list("Enrollments retrieved", enrollments))
}

#[utoipa::path(
    post,
    path = "/payment-class",
    request_body = CompletePaymentDto,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentReceipt),
        (status = 200, description = "Payment reference already processed; original enrollment returned", body = EnrollmentReceipt),
        (status = 400, description = "Payment reference used for another enrollment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only"),
        (status = 404, description = "Course or selection not found"),
        (status = 409, description = "No seats available or the selection could not be removed")
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn complete_payment(
    State(state): State<AppState>,
    CurrentIdentity(student): CurrentIdentity,
    ValidatedJson(dto): ValidatedJson<CompletePaymentDto>,
) -> Result<ApiResponse<EnrollmentReceipt>, AppError> {
    let receipt =
        EnrollmentService::complete_payment(state.store.as_ref(), &student.email, dto).await?;

    if receipt.replayed {
        return Ok(ApiResponse::ok("Payment already processed", receipt));
    }

    Ok(ApiResponse::created("Enrollment complete", receipt))
}
