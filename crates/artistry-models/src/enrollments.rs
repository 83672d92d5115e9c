//! Enrollment records and the payment-completion payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::courses::Course;
use crate::ids::{CourseId, EnrollmentId, SelectionId};

/// Durable proof that a student paid for and enrolled in a course.
/// Append-only; `payment_ref` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub student_email: String,
    pub course_id: CourseId,
    pub payment_ref: String,
    pub amount_cents: i64,
    pub date: DateTime<Utc>,
}

/// Body of `POST /payment-class`, sent after the processor confirmed funds.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentDto {
    pub course_id: CourseId,
    pub selection_id: SelectionId,
    /// Processor transaction reference; doubles as the idempotency key
    #[validate(length(min = 1, max = 255))]
    pub payment_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_email: String,
    pub course_id: CourseId,
    pub payment_ref: String,
    pub amount_cents: i64,
}

/// Composite result of a committed enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentReceipt {
    pub enrollment: EnrollmentRecord,
    /// Course as it stood after the seat was taken
    pub course: Course,
    pub removed_selection_id: Option<SelectionId>,
    /// True when the payment reference had already been processed
    pub replayed: bool,
}
