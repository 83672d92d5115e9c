//! Enrollment transaction.
//!
//! Turns a paid selection into an enrollment. Every write happens inside one
//! store transaction, so either all of them become visible or none do:
//!
//! 1. Replay check on the payment reference
//! 2. Fetch the course and the caller's selection
//! 3. Take a seat (only while `seats > 0`)
//! 4. Record the enrollment
//! 5. Remove the selection
//! 6. Commit
//!
//! The attempt moves from [`EnrollmentState::Attempting`] to either
//! [`EnrollmentState::Committed`] or [`EnrollmentState::Aborted`]; an
//! aborted attempt is rolled back and never retried here.

use std::fmt;

use artistry_core::AppError;
use artistry_db::{COURSE_ENROLLMENT, EnrollmentTx, StoreError};
use artistry_models::{
    CompletePaymentDto, Course, CourseId, EnrollmentReceipt, EnrollmentRecord, NewEnrollment,
    SelectionId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub student_email: String,
    pub course_id: CourseId,
    pub selection_id: SelectionId,
    pub payment_ref: String,
}

impl EnrollmentRequest {
    pub fn new(student_email: &str, dto: CompletePaymentDto) -> Self {
        Self {
            student_email: student_email.to_string(),
            course_id: dto.course_id,
            selection_id: dto.selection_id,
            payment_ref: dto.payment_ref,
        }
    }

    /// Whether `record` was produced by this same request.
    pub fn matches(&self, record: &EnrollmentRecord) -> bool {
        record.student_email == self.student_email && record.course_id == self.course_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStep {
    ReplayCheck,
    FetchCourse,
    FetchSelection,
    TakeSeat,
    RecordEnrollment,
    RemoveSelection,
    Commit,
}

impl EnrollmentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStep::ReplayCheck => "replay_check",
            EnrollmentStep::FetchCourse => "fetch_course",
            EnrollmentStep::FetchSelection => "fetch_selection",
            EnrollmentStep::TakeSeat => "take_seat",
            EnrollmentStep::RecordEnrollment => "record_enrollment",
            EnrollmentStep::RemoveSelection => "remove_selection",
            EnrollmentStep::Commit => "commit",
        }
    }
}

impl fmt::Display for EnrollmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The payment reference already paid for another student or course
    PaymentRefReused,
    CourseNotFound,
    /// Missing, or owned by another student, or for another course
    SelectionNotFound,
    NoSeatsAvailable,
    /// A concurrent attempt recorded the same payment reference first
    DuplicatePaymentRef,
    /// The student already holds an enrollment for this course
    AlreadyEnrolled,
    SelectionNotRemoved,
    Store(String),
}

impl AbortReason {
    pub fn into_error(self) -> AppError {
        match self {
            AbortReason::PaymentRefReused => {
                AppError::bad_request("Payment reference already used")
            }
            AbortReason::CourseNotFound => AppError::not_found("Course not found"),
            AbortReason::SelectionNotFound => AppError::not_found("Selection not found"),
            AbortReason::NoSeatsAvailable => AppError::update_failed("No seats available"),
            AbortReason::DuplicatePaymentRef => {
                AppError::update_failed("Payment reference already recorded")
            }
            AbortReason::AlreadyEnrolled => {
                AppError::bad_request("Already enrolled in this course")
            }
            AbortReason::SelectionNotRemoved => {
                AppError::update_failed("Selection could not be removed")
            }
            AbortReason::Store(message) => {
                AppError::internal_error(format!("Enrollment store failure: {}", message))
            }
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::PaymentRefReused => f.write_str("payment reference already used"),
            AbortReason::CourseNotFound => f.write_str("course not found"),
            AbortReason::SelectionNotFound => f.write_str("selection not found"),
            AbortReason::NoSeatsAvailable => f.write_str("no seats available"),
            AbortReason::DuplicatePaymentRef => f.write_str("duplicate payment reference"),
            AbortReason::AlreadyEnrolled => f.write_str("already enrolled"),
            AbortReason::SelectionNotRemoved => f.write_str("selection not removed"),
            AbortReason::Store(message) => write!(f, "store failure: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentState {
    Attempting,
    Committed(EnrollmentReceipt),
    Aborted {
        step: EnrollmentStep,
        reason: AbortReason,
    },
}

type StepResult<T> = Result<T, (EnrollmentStep, AbortReason)>;

fn store_failure(step: EnrollmentStep) -> impl FnOnce(StoreError) -> (EnrollmentStep, AbortReason) {
    move |e| (step, AbortReason::Store(e.to_string()))
}

/// Receipt plus whether anything was written.
enum Settled {
    Written(EnrollmentReceipt),
    Replayed(EnrollmentReceipt),
}

pub struct EnrollmentTransaction<'a> {
    request: &'a EnrollmentRequest,
    state: EnrollmentState,
}

impl<'a> EnrollmentTransaction<'a> {
    pub fn new(request: &'a EnrollmentRequest) -> Self {
        Self {
            request,
            state: EnrollmentState::Attempting,
        }
    }

    pub fn state(&self) -> &EnrollmentState {
        &self.state
    }

    /// Drives the attempt to a settled state. `tx` is committed when the
    /// attempt wrote anything and rolled back otherwise.
    pub async fn run(mut self, mut tx: Box<dyn EnrollmentTx>) -> EnrollmentState {
        self.state = match self.execute(tx.as_mut()).await {
            Ok(Settled::Written(receipt)) => match tx.commit().await {
                Ok(()) => EnrollmentState::Committed(receipt),
                Err(e) => EnrollmentState::Aborted {
                    step: EnrollmentStep::Commit,
                    reason: AbortReason::Store(e.to_string()),
                },
            },
            Ok(Settled::Replayed(receipt)) => {
                discard(tx, EnrollmentStep::ReplayCheck).await;
                EnrollmentState::Committed(receipt)
            }
            Err((step, reason)) => {
                discard(tx, step).await;
                EnrollmentState::Aborted { step, reason }
            }
        };

        self.state
    }

    async fn execute(&self, tx: &mut dyn EnrollmentTx) -> StepResult<Settled> {
        let request = self.request;

        if let Some(receipt) = self.replay(tx).await? {
            return Ok(Settled::Replayed(receipt));
        }

        tx.find_course(request.course_id)
            .await
            .map_err(store_failure(EnrollmentStep::FetchCourse))?
            .ok_or((EnrollmentStep::FetchCourse, AbortReason::CourseNotFound))?;

        tx.find_selection(request.selection_id)
            .await
            .map_err(store_failure(EnrollmentStep::FetchSelection))?
            .filter(|selection| {
                selection.student_email == request.student_email
                    && selection.course_id == request.course_id
            })
            .ok_or((EnrollmentStep::FetchSelection, AbortReason::SelectionNotFound))?;

        let course = tx
            .take_seat(request.course_id)
            .await
            .map_err(store_failure(EnrollmentStep::TakeSeat))?
            .ok_or((EnrollmentStep::TakeSeat, AbortReason::NoSeatsAvailable))?;

        let enrollment = tx
            .insert_enrollment(&NewEnrollment {
                student_email: request.student_email.clone(),
                course_id: request.course_id,
                payment_ref: request.payment_ref.clone(),
                amount_cents: course.price_cents,
            })
            .await
            .map_err(|e| {
                let reason = if e.is_duplicate_of(COURSE_ENROLLMENT) {
                    AbortReason::AlreadyEnrolled
                } else if e.is_duplicate() {
                    AbortReason::DuplicatePaymentRef
                } else {
                    AbortReason::Store(e.to_string())
                };
                (EnrollmentStep::RecordEnrollment, reason)
            })?;

        let removed = tx
            .delete_selection(request.selection_id)
            .await
            .map_err(store_failure(EnrollmentStep::RemoveSelection))?;
        if !removed {
            return Err((
                EnrollmentStep::RemoveSelection,
                AbortReason::SelectionNotRemoved,
            ));
        }

        Ok(Settled::Written(EnrollmentReceipt {
            enrollment,
            course,
            removed_selection_id: Some(request.selection_id),
            replayed: false,
        }))
    }

    /// `Some` when this payment reference already produced this enrollment.
    async fn replay(&self, tx: &mut dyn EnrollmentTx) -> StepResult<Option<EnrollmentReceipt>> {
        let step = EnrollmentStep::ReplayCheck;

        let Some(existing) = tx
            .find_enrollment_by_payment_ref(&self.request.payment_ref)
            .await
            .map_err(store_failure(step))?
        else {
            return Ok(None);
        };

        if !self.request.matches(&existing) {
            return Err((step, AbortReason::PaymentRefReused));
        }

        let course = tx
            .find_course(existing.course_id)
            .await
            .map_err(store_failure(step))?
            .ok_or((step, AbortReason::CourseNotFound))?;

        Ok(Some(replayed_receipt(existing, course)))
    }
}

pub fn replayed_receipt(enrollment: EnrollmentRecord, course: Course) -> EnrollmentReceipt {
    EnrollmentReceipt {
        enrollment,
        course,
        removed_selection_id: None,
        replayed: true,
    }
}

async fn discard(tx: Box<dyn EnrollmentTx>, step: EnrollmentStep) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, step = %step, "Enrollment rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_db::{MemoryStore, Store, StoreResult};
    use artistry_models::{CourseChanges, CourseStatus, NewCourse, SelectionEntry};
    use async_trait::async_trait;

    const STUDENT: &str = "student@artistry.io";
    const INSTRUCTOR: &str = "instructor@artistry.io";

    struct Fixture {
        store: MemoryStore,
        course: Course,
        selection: SelectionEntry,
    }

    async fn fixture(seats: i32) -> Fixture {
        let store = MemoryStore::new();
        let course = store
            .insert_course(&NewCourse {
                title: "Life Drawing".to_string(),
                description: None,
                image_url: None,
                instructor_email: INSTRUCTOR.to_string(),
                instructor_name: None,
                price_cents: 2500,
                seats,
            })
            .await
            .unwrap();
        let course = store
            .transition_course_status(course.id, CourseStatus::Pending, CourseStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        let selection = store.insert_selection(STUDENT, course.id).await.unwrap();

        Fixture {
            store,
            course,
            selection,
        }
    }

    fn request(f: &Fixture, payment_ref: &str) -> EnrollmentRequest {
        EnrollmentRequest {
            student_email: STUDENT.to_string(),
            course_id: f.course.id,
            selection_id: f.selection.id,
            payment_ref: payment_ref.to_string(),
        }
    }

    async fn run(store: &MemoryStore, request: &EnrollmentRequest) -> EnrollmentState {
        let tx = store.begin().await.unwrap();
        EnrollmentTransaction::new(request).run(tx).await
    }

    /// Delegates to a real transaction but reports that the selection
    /// could not be removed.
    struct SelectionVanishes(Box<dyn EnrollmentTx>);

    #[async_trait]
    impl EnrollmentTx for SelectionVanishes {
        async fn find_enrollment_by_payment_ref(
            &mut self,
            payment_ref: &str,
        ) -> StoreResult<Option<EnrollmentRecord>> {
            self.0.find_enrollment_by_payment_ref(payment_ref).await
        }

        async fn find_course(&mut self, id: CourseId) -> StoreResult<Option<Course>> {
            self.0.find_course(id).await
        }

        async fn find_selection(&mut self, id: SelectionId) -> StoreResult<Option<SelectionEntry>> {
            self.0.find_selection(id).await
        }

        async fn take_seat(&mut self, course_id: CourseId) -> StoreResult<Option<Course>> {
            self.0.take_seat(course_id).await
        }

        async fn insert_enrollment(
            &mut self,
            enrollment: &NewEnrollment,
        ) -> StoreResult<EnrollmentRecord> {
            self.0.insert_enrollment(enrollment).await
        }

        async fn delete_selection(&mut self, _id: SelectionId) -> StoreResult<bool> {
            Ok(false)
        }

        async fn commit(self: Box<Self>) -> StoreResult<()> {
            self.0.commit().await
        }

        async fn rollback(self: Box<Self>) -> StoreResult<()> {
            self.0.rollback().await
        }
    }

    #[test]
    fn test_new_attempt_is_attempting() {
        let request = EnrollmentRequest {
            student_email: STUDENT.to_string(),
            course_id: CourseId::new(),
            selection_id: SelectionId::new(),
            payment_ref: "pi_1".to_string(),
        };
        let attempt = EnrollmentTransaction::new(&request);
        assert_eq!(attempt.state(), &EnrollmentState::Attempting);
    }

    #[tokio::test]
    async fn test_commit_applies_every_write() {
        let f = fixture(3).await;
        let request = request(&f, "pi_commit");

        let EnrollmentState::Committed(receipt) = run(&f.store, &request).await else {
            panic!("expected commit");
        };
        assert!(!receipt.replayed);
        assert_eq!(receipt.removed_selection_id, Some(f.selection.id));
        assert_eq!(receipt.enrollment.amount_cents, 2500);
        assert_eq!(receipt.course.seats, 2);
        assert_eq!(receipt.course.enrolled_count, 1);

        let course = f.store.find_course(f.course.id).await.unwrap().unwrap();
        assert_eq!(course.seats, 2);
        assert_eq!(course.enrolled_count, 1);
        assert!(f.store.find_selection(f.selection.id).await.unwrap().is_none());
        assert!(
            f.store
                .find_enrollment_by_payment_ref("pi_commit")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_replay_returns_existing_record() {
        let f = fixture(3).await;
        let request = request(&f, "pi_replay");

        let EnrollmentState::Committed(first) = run(&f.store, &request).await else {
            panic!("expected commit");
        };
        let EnrollmentState::Committed(second) = run(&f.store, &request).await else {
            panic!("expected replay");
        };

        assert!(second.replayed);
        assert_eq!(second.enrollment, first.enrollment);
        assert_eq!(second.removed_selection_id, None);

        let course = f.store.find_course(f.course.id).await.unwrap().unwrap();
        assert_eq!(course.seats, 2);
        assert_eq!(course.enrolled_count, 1);
    }

    #[tokio::test]
    async fn test_payment_ref_from_another_student_aborts() {
        let f = fixture(3).await;
        run(&f.store, &request(&f, "pi_shared")).await;

        let other = EnrollmentRequest {
            student_email: "other@artistry.io".to_string(),
            ..request(&f, "pi_shared")
        };
        let state = run(&f.store, &other).await;
        assert_eq!(
            state,
            EnrollmentState::Aborted {
                step: EnrollmentStep::ReplayCheck,
                reason: AbortReason::PaymentRefReused,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_course_aborts_before_writing() {
        let f = fixture(3).await;
        let request = EnrollmentRequest {
            course_id: CourseId::new(),
            ..request(&f, "pi_missing")
        };

        let state = run(&f.store, &request).await;
        assert_eq!(
            state,
            EnrollmentState::Aborted {
                step: EnrollmentStep::FetchCourse,
                reason: AbortReason::CourseNotFound,
            }
        );
    }

    #[tokio::test]
    async fn test_selection_of_another_student_aborts() {
        let f = fixture(3).await;
        let request = EnrollmentRequest {
            student_email: "intruder@artistry.io".to_string(),
            ..request(&f, "pi_intruder")
        };

        let state = run(&f.store, &request).await;
        assert_eq!(
            state,
            EnrollmentState::Aborted {
                step: EnrollmentStep::FetchSelection,
                reason: AbortReason::SelectionNotFound,
            }
        );

        let course = f.store.find_course(f.course.id).await.unwrap().unwrap();
        assert_eq!(course.seats, 3);
    }

    #[tokio::test]
    async fn test_no_seats_aborts_and_keeps_selection() {
        let f = fixture(1).await;
        f.store
            .update_course(
                f.course.id,
                INSTRUCTOR,
                &CourseChanges {
                    seats: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let state = run(&f.store, &request(&f, "pi_full")).await;
        assert_eq!(
            state,
            EnrollmentState::Aborted {
                step: EnrollmentStep::TakeSeat,
                reason: AbortReason::NoSeatsAvailable,
            }
        );
        assert!(f.store.find_selection(f.selection.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_removal_rolls_back_seat_and_record() {
        let f = fixture(2).await;
        let request = request(&f, "pi_rollback");

        let tx = Box::new(SelectionVanishes(f.store.begin().await.unwrap()));
        let state = EnrollmentTransaction::new(&request).run(tx).await;
        assert_eq!(
            state,
            EnrollmentState::Aborted {
                step: EnrollmentStep::RemoveSelection,
                reason: AbortReason::SelectionNotRemoved,
            }
        );

        let course = f.store.find_course(f.course.id).await.unwrap().unwrap();
        assert_eq!(course.seats, 2);
        assert_eq!(course.enrolled_count, 0);
        assert!(
            f.store
                .find_enrollment_by_payment_ref("pi_rollback")
                .await
                .unwrap()
                .is_none()
        );
        assert!(f.store.find_selection(f.selection.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_enrollment_in_same_course_aborts() {
        let f = fixture(3).await;
        let EnrollmentState::Committed(_) = run(&f.store, &request(&f, "pi_first")).await else {
            panic!("expected commit");
        };

        // A selection that slipped in while the first payment committed
        let stray = f.store.insert_selection(STUDENT, f.course.id).await.unwrap();
        let second = EnrollmentRequest {
            selection_id: stray.id,
            ..request(&f, "pi_second")
        };

        assert_eq!(
            run(&f.store, &second).await,
            EnrollmentState::Aborted {
                step: EnrollmentStep::RecordEnrollment,
                reason: AbortReason::AlreadyEnrolled,
            }
        );

        let course = f.store.find_course(f.course.id).await.unwrap().unwrap();
        assert_eq!(course.seats, 2);
        assert_eq!(course.enrolled_count, 1);
        assert_eq!(f.store.list_enrollments(STUDENT).await.unwrap().len(), 1);
        assert!(f.store.find_selection(stray.id).await.unwrap().is_some());
    }

    #[test]
    fn test_abort_reasons_map_to_taxonomy() {
        use artistry_core::ErrorKind;

        assert_eq!(
            AbortReason::NoSeatsAvailable.into_error().kind,
            ErrorKind::UpdateFailed
        );
        assert_eq!(
            AbortReason::SelectionNotFound.into_error().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            AbortReason::PaymentRefReused.into_error().kind,
            ErrorKind::ValidationError
        );
        assert_eq!(
            AbortReason::AlreadyEnrolled.into_error().kind,
            ErrorKind::ValidationError
        );
        assert_eq!(
            AbortReason::Store("boom".to_string()).into_error().kind,
            ErrorKind::InternalError
        );
    }
}
