use tracing::{Instrument, instrument};

use artistry_core::AppError;
use artistry_db::Store;
use artistry_models::{CompletePaymentDto, EnrollmentReceipt, EnrollmentRecord};

use crate::metrics::track_enrollment;
use crate::modules::enrollments::transaction::{
    AbortReason, EnrollmentRequest, EnrollmentState, EnrollmentTransaction, replayed_receipt,
};
use crate::utils::tracing::{record_error, record_success};
use crate::{audit_event, business_span};

pub struct EnrollmentService;

impl EnrollmentService {
    #[instrument(skip(store))]
    pub async fn list_enrollments(
        store: &dyn Store,
        student_email: &str,
    ) -> Result<Vec<EnrollmentRecord>, AppError> {
        Ok(store.list_enrollments(student_email).await?)
    }

    /// Enrolls the student in the course they paid for.
    ///
    /// Replaying the same `payment_ref` returns the original record without
    /// writing again, including when a concurrent attempt won the race to
    /// record it.
    pub async fn complete_payment(
        store: &dyn Store,
        student_email: &str,
        dto: CompletePaymentDto,
    ) -> Result<EnrollmentReceipt, AppError> {
        let request = EnrollmentRequest::new(student_email, dto);
        let span = business_span!(
            "enrollment.complete",
            user.email = %request.student_email,
            course.id = %request.course_id,
            payment.reference = %request.payment_ref
        );

        Self::attempt(store, &request).instrument(span).await
    }

    async fn attempt(
        store: &dyn Store,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentReceipt, AppError> {
        let tx = store.begin().await?;

        match EnrollmentTransaction::new(request).run(tx).await {
            EnrollmentState::Committed(receipt) => {
                Self::settled(request, &receipt);
                Ok(receipt)
            }
            EnrollmentState::Aborted {
                step,
                reason: reason @ (AbortReason::DuplicatePaymentRef | AbortReason::AlreadyEnrolled),
            } => match Self::replay_winner(store, request, reason).await {
                Ok(receipt) => {
                    Self::settled(request, &receipt);
                    Ok(receipt)
                }
                Err(e) => {
                    track_enrollment(step.as_str());
                    record_error(&e.to_string());
                    tracing::warn!(step = %step, error = %e, "Enrollment aborted");
                    Err(e)
                }
            },
            EnrollmentState::Aborted { step, reason } => {
                track_enrollment(step.as_str());
                record_error(&reason.to_string());
                tracing::warn!(step = %step, reason = %reason, "Enrollment aborted");
                Err(reason.into_error())
            }
            EnrollmentState::Attempting => {
                Err(AppError::internal_error("Enrollment attempt did not settle"))
            }
        }
    }

    /// A concurrent attempt recorded an enrollment first; hand back its
    /// record when it carries this payment reference for the same student and
    /// course. Otherwise the attempt fails with `reason`.
    async fn replay_winner(
        store: &dyn Store,
        request: &EnrollmentRequest,
        reason: AbortReason,
    ) -> Result<EnrollmentReceipt, AppError> {
        let existing = store
            .find_enrollment_by_payment_ref(&request.payment_ref)
            .await?
            .ok_or_else(|| reason.into_error())?;

        if !request.matches(&existing) {
            return Err(AbortReason::PaymentRefReused.into_error());
        }

        let course = store
            .find_course(existing.course_id)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        Ok(replayed_receipt(existing, course))
    }

    fn settled(request: &EnrollmentRequest, receipt: &EnrollmentReceipt) {
        if receipt.replayed {
            track_enrollment("replayed");
            tracing::info!(payment.reference = %request.payment_ref, "Enrollment replayed");
        } else {
            track_enrollment("committed");
            audit_event!(
                "enrolled",
                "enrollment",
                enrollment.id = %receipt.enrollment.id,
                course.id = %receipt.course.id,
                user.email = %request.student_email
            );
        }
        record_success();
    }
}
