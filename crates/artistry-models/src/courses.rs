//! Course listing models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::CourseId;

/// Approval state of a course. `Approved` and `Deny` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Pending,
    Approved,
    Deny,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Pending => "pending",
            CourseStatus::Approved => "approved",
            CourseStatus::Deny => "deny",
        }
    }

    /// Whether an admin may move a course from `self` to `next`.
    pub fn can_transition_to(&self, next: CourseStatus) -> bool {
        matches!(
            (self, next),
            (CourseStatus::Pending, CourseStatus::Approved)
                | (CourseStatus::Pending, CourseStatus::Deny)
        )
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructor_email: String,
    pub instructor_name: Option<String>,
    /// Price in minor currency units
    pub price_cents: i64,
    /// Seats still available
    pub seats: i32,
    pub enrolled_count: i32,
    pub status: CourseStatus,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(range(min = 0, max = 100000))]
    pub seats: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 0, max = 100000))]
    pub seats: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CourseFeedbackDto {
    #[validate(length(min = 1, max = 2000))]
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseStatusQuery {
    pub status: Option<CourseStatus>,
}

/// Store-level insert payload. New courses always start `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructor_email: String,
    pub instructor_name: Option<String>,
    pub price_cents: i64,
    pub seats: i32,
}

/// Store-level partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: Option<i64>,
    pub seats: Option<i32>,
}

impl From<UpdateCourseDto> for CourseChanges {
    fn from(dto: UpdateCourseDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            image_url: dto.image_url,
            price_cents: dto.price_cents,
            seats: dto.seats,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub instructor_email: Option<String>,
}

impl CourseFilter {
    pub fn approved() -> Self {
        Self {
            status: Some(CourseStatus::Approved),
            instructor_email: None,
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.status.is_none_or(|s| s == course.status)
            && self
                .instructor_email
                .as_deref()
                .is_none_or(|e| e == course.instructor_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_transitions() {
        assert!(CourseStatus::Pending.can_transition_to(CourseStatus::Approved));
        assert!(CourseStatus::Pending.can_transition_to(CourseStatus::Deny));
        assert!(!CourseStatus::Pending.can_transition_to(CourseStatus::Pending));
        assert!(!CourseStatus::Approved.can_transition_to(CourseStatus::Deny));
        assert!(!CourseStatus::Approved.can_transition_to(CourseStatus::Pending));
        assert!(!CourseStatus::Deny.can_transition_to(CourseStatus::Approved));
    }

    #[test]
    fn test_create_course_dto_validation() {
        let valid = CreateCourseDto {
            title: "Watercolour Basics".to_string(),
            description: None,
            image_url: Some("https://cdn.example.com/wc.png".to_string()),
            price_cents: 4900,
            seats: 20,
        };
        assert!(valid.validate().is_ok());

        let negative_seats = CreateCourseDto {
            seats: -1,
            ..valid.clone()
        };
        assert!(negative_seats.validate().is_err());

        let negative_price = CreateCourseDto {
            price_cents: -5,
            ..valid.clone()
        };
        assert!(negative_price.validate().is_err());

        let empty_title = CreateCourseDto {
            title: String::new(),
            ..valid
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_update_course_dto_allows_empty_patch() {
        assert!(UpdateCourseDto::default().validate().is_ok());

        let bad = UpdateCourseDto {
            seats: Some(-3),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&CourseStatus::Deny).unwrap(), r#""deny""#);
        let s: CourseStatus = serde_json::from_str(r#""approved""#).unwrap();
        assert_eq!(s, CourseStatus::Approved);
    }
}
