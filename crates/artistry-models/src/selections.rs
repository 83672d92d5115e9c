//! Course selection ("cart") models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{CourseId, SelectionId};

/// A student's pending intent to enroll in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    pub id: SelectionId,
    pub student_email: String,
    pub course_id: CourseId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectCourseDto {
    pub course_id: CourseId,
    /// Optional; when present it must equal the caller's email
    #[validate(email)]
    pub student_email: Option<String>,
}
