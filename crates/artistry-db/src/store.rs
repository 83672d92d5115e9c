//! Store port used by every service.
//!
//! [`Store`] covers plain reads and single-statement writes. The enrollment
//! transaction needs several writes to land together, so it runs against an
//! [`EnrollmentTx`] obtained from [`Store::begin`]; dropping or rolling back
//! the transaction discards every staged write.

use async_trait::async_trait;
use thiserror::Error;

use artistry_models::{
    Course, CourseChanges, CourseFilter, CourseId, CourseStatus, EnrollmentRecord, Identity,
    IdentityFilter, IdentityId, IdentityUpsert, NewCourse, NewEnrollment, SelectionEntry,
    SelectionId, UserRole,
};

/// [`StoreError::Duplicate`] entity when an enrollment's `payment_ref` is taken.
pub const PAYMENT_REF: &str = "payment reference";

/// [`StoreError::Duplicate`] entity when the student already holds an
/// enrollment for the course.
pub const COURSE_ENROLLMENT: &str = "course enrollment";

/// Errors raised by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{entity} already exists: {detail}")]
    Duplicate { entity: &'static str, detail: String },

    /// The store could not be reached or configured.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }

    pub fn is_duplicate_of(&self, entity: &str) -> bool {
        matches!(self, StoreError::Duplicate { entity: e, .. } if *e == entity)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent store for identities, courses, selections and enrollments.
///
/// Identity lookups only see live (not soft-deleted) identities.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // Identities

    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_identity(&self, id: IdentityId) -> StoreResult<Option<Identity>>;

    /// Oldest first.
    async fn list_identities(&self, filter: &IdentityFilter) -> StoreResult<Vec<Identity>>;

    /// Inserts on first sight of `email` (role defaults to student), otherwise
    /// overwrites the supplied fields and keeps the rest. `None` when the
    /// email belongs to a soft-deleted identity, which is left untouched.
    async fn upsert_identity(
        &self,
        email: &str,
        changes: &IdentityUpsert,
    ) -> StoreResult<Option<Identity>>;

    async fn set_identity_role(
        &self,
        id: IdentityId,
        role: UserRole,
    ) -> StoreResult<Option<Identity>>;

    /// Returns `false` when no live identity had this id.
    async fn soft_delete_identity(&self, id: IdentityId) -> StoreResult<bool>;

    // Courses

    async fn insert_course(&self, course: &NewCourse) -> StoreResult<Course>;

    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>>;

    /// Newest first.
    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>>;

    async fn count_courses(&self, filter: &CourseFilter) -> StoreResult<i64>;

    /// Applies `changes` only when the course belongs to `instructor_email`.
    async fn update_course(
        &self,
        id: CourseId,
        instructor_email: &str,
        changes: &CourseChanges,
    ) -> StoreResult<Option<Course>>;

    /// Conditional status update; `None` when the course is missing or is not
    /// currently in `from`.
    async fn transition_course_status(
        &self,
        id: CourseId,
        from: CourseStatus,
        to: CourseStatus,
    ) -> StoreResult<Option<Course>>;

    async fn set_course_feedback(&self, id: CourseId, feedback: &str)
    -> StoreResult<Option<Course>>;

    /// Deletes an instructor's own course while nobody is enrolled in it.
    /// Pending selections of the course go with it.
    async fn delete_course(&self, id: CourseId, instructor_email: &str) -> StoreResult<bool>;

    // Selections

    /// Fails with [`StoreError::Duplicate`] if the student already selected
    /// the course.
    async fn insert_selection(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<SelectionEntry>;

    async fn find_selection(&self, id: SelectionId) -> StoreResult<Option<SelectionEntry>>;

    async fn find_selection_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<SelectionEntry>>;

    /// Oldest first.
    async fn list_selections(&self, student_email: &str) -> StoreResult<Vec<SelectionEntry>>;

    async fn delete_selection(&self, id: SelectionId, student_email: &str) -> StoreResult<bool>;

    // Enrollments

    async fn find_enrollment_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>>;

    async fn find_enrollment_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<EnrollmentRecord>>;

    /// Newest first.
    async fn list_enrollments(&self, student_email: &str) -> StoreResult<Vec<EnrollmentRecord>>;

    /// Opens the transactional unit used by the enrollment flow.
    async fn begin(&self) -> StoreResult<Box<dyn EnrollmentTx>>;
}

/// Writes staged here become visible together on [`EnrollmentTx::commit`].
#[async_trait]
pub trait EnrollmentTx: Send {
    async fn find_enrollment_by_payment_ref(
        &mut self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>>;

    async fn find_course(&mut self, id: CourseId) -> StoreResult<Option<Course>>;

    async fn find_selection(&mut self, id: SelectionId) -> StoreResult<Option<SelectionEntry>>;

    /// Decrements `seats` and increments `enrolled_count` when `seats > 0`.
    /// `None` when no seat was available.
    async fn take_seat(&mut self, course_id: CourseId) -> StoreResult<Option<Course>>;

    /// Fails with [`StoreError::Duplicate`] when `payment_ref` is taken
    /// ([`PAYMENT_REF`]) or the student is already enrolled in the course
    /// ([`COURSE_ENROLLMENT`]).
    async fn insert_enrollment(
        &mut self,
        enrollment: &NewEnrollment,
    ) -> StoreResult<EnrollmentRecord>;

    async fn delete_selection(&mut self, id: SelectionId) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
