//! # Artistry Models
//!
//! Domain models and DTOs for the Artistry Academia API.
//!
//! # Modules
//!
//! - [`auth`]: Credential issuance requests and responses
//! - [`courses`]: Course listings and the approval status
//! - [`enrollments`]: Enrollment records and payment completion
//! - [`ids`]: Strongly-typed record IDs
//! - [`payments`]: Payment-intent requests and responses
//! - [`selections`]: Pending course selections
//! - [`users`]: Identities and roles

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod ids;
pub mod payments;
pub mod selections;
pub mod users;

pub use auth::{TokenRequest, TokenResponse};
pub use courses::{
    Course, CourseChanges, CourseFeedbackDto, CourseFilter, CourseStatus, CourseStatusQuery,
    CreateCourseDto, NewCourse, UpdateCourseDto,
};
pub use enrollments::{CompletePaymentDto, EnrollmentReceipt, EnrollmentRecord, NewEnrollment};
pub use ids::{CourseId, EnrollmentId, IdentityId, SelectionId};
pub use payments::{CreatePaymentIntentDto, PaymentIntentResponse};
pub use selections::{SelectCourseDto, SelectionEntry};
pub use users::{
    AdminFlag, Identity, IdentityFilter, IdentityUpsert, InstructorFlag, UpsertIdentityDto,
    UserRole,
};
