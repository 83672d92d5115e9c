//! In-process [`Store`] for tests and local runs without PostgreSQL.
//!
//! All collections sit behind one async mutex. A transaction holds the lock
//! for its whole lifetime and stages its writes on a copy of the
//! collections; commit swaps the copy in, rollback (or drop) discards it.
//! Concurrent enrollments therefore run one after another.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use artistry_models::{
    Course, CourseChanges, CourseFilter, CourseId, CourseStatus, EnrollmentId, EnrollmentRecord,
    Identity, IdentityFilter, IdentityId, IdentityUpsert, NewCourse, NewEnrollment,
    SelectionEntry, SelectionId, UserRole,
};

use crate::store::{COURSE_ENROLLMENT, EnrollmentTx, PAYMENT_REF, Store, StoreError, StoreResult};

#[derive(Clone, Debug, Default)]
struct Collections {
    identities: Vec<Identity>,
    courses: Vec<Course>,
    selections: Vec<SelectionEntry>,
    enrollments: Vec<EnrollmentRecord>,
}

impl Collections {
    fn live_identity_mut(&mut self, id: IdentityId) -> Option<&mut Identity> {
        self.identities
            .iter_mut()
            .find(|i| i.id == id && !i.is_deleted)
    }

    fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    fn course_mut(&mut self, id: CourseId) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    fn enrollment_by_payment_ref(&self, payment_ref: &str) -> Option<&EnrollmentRecord> {
        self.enrollments
            .iter()
            .find(|e| e.payment_ref == payment_ref)
    }

    fn take_seat(&mut self, id: CourseId) -> Option<Course> {
        let course = self.course_mut(id).filter(|c| c.seats > 0)?;
        course.seats -= 1;
        course.enrolled_count += 1;
        course.updated_at = Utc::now();
        Some(course.clone())
    }

    fn insert_enrollment(&mut self, new: &NewEnrollment) -> StoreResult<EnrollmentRecord> {
        if self.enrollment_by_payment_ref(&new.payment_ref).is_some() {
            return Err(StoreError::Duplicate {
                entity: PAYMENT_REF,
                detail: new.payment_ref.clone(),
            });
        }

        if self
            .enrollments
            .iter()
            .any(|e| e.student_email == new.student_email && e.course_id == new.course_id)
        {
            return Err(StoreError::Duplicate {
                entity: COURSE_ENROLLMENT,
                detail: format!("{} in {}", new.student_email, new.course_id),
            });
        }

        let record = EnrollmentRecord {
            id: EnrollmentId::new(),
            student_email: new.student_email.clone(),
            course_id: new.course_id,
            payment_ref: new.payment_ref.clone(),
            amount_cents: new.amount_cents,
            date: Utc::now(),
        };
        self.enrollments.push(record.clone());
        Ok(record)
    }

    fn remove_selection(&mut self, predicate: impl Fn(&SelectionEntry) -> bool) -> bool {
        let before = self.selections.len();
        self.selections.retain(|s| !predicate(s));
        self.selections.len() < before
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let data = self.inner.lock().await;
        Ok(data
            .identities
            .iter()
            .find(|i| i.email == email && !i.is_deleted)
            .cloned())
    }

    async fn find_identity(&self, id: IdentityId) -> StoreResult<Option<Identity>> {
        let data = self.inner.lock().await;
        Ok(data
            .identities
            .iter()
            .find(|i| i.id == id && !i.is_deleted)
            .cloned())
    }

    async fn list_identities(&self, filter: &IdentityFilter) -> StoreResult<Vec<Identity>> {
        let data = self.inner.lock().await;
        Ok(data
            .identities
            .iter()
            .filter(|i| !i.is_deleted && filter.role.is_none_or(|r| r == i.role))
            .cloned()
            .collect())
    }

    async fn upsert_identity(
        &self,
        email: &str,
        changes: &IdentityUpsert,
    ) -> StoreResult<Option<Identity>> {
        let mut data = self.inner.lock().await;
        let now = Utc::now();

        if let Some(existing) = data.identities.iter_mut().find(|i| i.email == email) {
            if existing.is_deleted {
                return Ok(None);
            }
            if let Some(name) = &changes.name {
                existing.name = Some(name.clone());
            }
            if let Some(photo_url) = &changes.photo_url {
                existing.photo_url = Some(photo_url.clone());
            }
            if let Some(role) = changes.role {
                existing.role = role;
            }
            existing.updated_at = now;
            return Ok(Some(existing.clone()));
        }

        let identity = Identity {
            id: IdentityId::new(),
            email: email.to_string(),
            name: changes.name.clone(),
            photo_url: changes.photo_url.clone(),
            role: changes.role.unwrap_or(UserRole::Student),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        data.identities.push(identity.clone());
        Ok(Some(identity))
    }

    async fn set_identity_role(
        &self,
        id: IdentityId,
        role: UserRole,
    ) -> StoreResult<Option<Identity>> {
        let mut data = self.inner.lock().await;
        Ok(data.live_identity_mut(id).map(|identity| {
            identity.role = role;
            identity.updated_at = Utc::now();
            identity.clone()
        }))
    }

    async fn soft_delete_identity(&self, id: IdentityId) -> StoreResult<bool> {
        let mut data = self.inner.lock().await;
        Ok(data
            .live_identity_mut(id)
            .map(|identity| {
                identity.is_deleted = true;
                identity.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn insert_course(&self, course: &NewCourse) -> StoreResult<Course> {
        let mut data = self.inner.lock().await;
        let now = Utc::now();
        let course = Course {
            id: CourseId::new(),
            title: course.title.clone(),
            description: course.description.clone(),
            image_url: course.image_url.clone(),
            instructor_email: course.instructor_email.clone(),
            instructor_name: course.instructor_name.clone(),
            price_cents: course.price_cents,
            seats: course.seats,
            enrolled_count: 0,
            status: CourseStatus::Pending,
            feedback: None,
            created_at: now,
            updated_at: now,
        };
        data.courses.push(course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        let data = self.inner.lock().await;
        Ok(data.course(id).cloned())
    }

    async fn list_courses(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let data = self.inner.lock().await;
        Ok(data
            .courses
            .iter()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn count_courses(&self, filter: &CourseFilter) -> StoreResult<i64> {
        let data = self.inner.lock().await;
        Ok(data.courses.iter().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn update_course(
        &self,
        id: CourseId,
        instructor_email: &str,
        changes: &CourseChanges,
    ) -> StoreResult<Option<Course>> {
        let mut data = self.inner.lock().await;
        let Some(course) = data
            .course_mut(id)
            .filter(|c| c.instructor_email == instructor_email)
        else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            course.title = title.clone();
        }
        if let Some(description) = &changes.description {
            course.description = Some(description.clone());
        }
        if let Some(image_url) = &changes.image_url {
            course.image_url = Some(image_url.clone());
        }
        if let Some(price_cents) = changes.price_cents {
            course.price_cents = price_cents;
        }
        if let Some(seats) = changes.seats {
            course.seats = seats;
        }
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn transition_course_status(
        &self,
        id: CourseId,
        from: CourseStatus,
        to: CourseStatus,
    ) -> StoreResult<Option<Course>> {
        let mut data = self.inner.lock().await;
        Ok(data.course_mut(id).filter(|c| c.status == from).map(|c| {
            c.status = to;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn set_course_feedback(
        &self,
        id: CourseId,
        feedback: &str,
    ) -> StoreResult<Option<Course>> {
        let mut data = self.inner.lock().await;
        Ok(data.course_mut(id).map(|c| {
            c.feedback = Some(feedback.to_string());
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_course(&self, id: CourseId, instructor_email: &str) -> StoreResult<bool> {
        let mut data = self.inner.lock().await;
        let Some(index) = data.courses.iter().position(|c| {
            c.id == id && c.instructor_email == instructor_email && c.enrolled_count == 0
        }) else {
            return Ok(false);
        };

        data.courses.remove(index);
        data.remove_selection(|s| s.course_id == id);
        Ok(true)
    }

    async fn insert_selection(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<SelectionEntry> {
        let mut data = self.inner.lock().await;
        if data
            .selections
            .iter()
            .any(|s| s.student_email == student_email && s.course_id == course_id)
        {
            return Err(StoreError::Duplicate {
                entity: "selection",
                detail: format!("course {}", course_id),
            });
        }

        let entry = SelectionEntry {
            id: SelectionId::new(),
            student_email: student_email.to_string(),
            course_id,
            created_at: Utc::now(),
        };
        data.selections.push(entry.clone());
        Ok(entry)
    }

    async fn find_selection(&self, id: SelectionId) -> StoreResult<Option<SelectionEntry>> {
        let data = self.inner.lock().await;
        Ok(data.selections.iter().find(|s| s.id == id).cloned())
    }

    async fn find_selection_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<SelectionEntry>> {
        let data = self.inner.lock().await;
        Ok(data
            .selections
            .iter()
            .find(|s| s.student_email == student_email && s.course_id == course_id)
            .cloned())
    }

    async fn list_selections(&self, student_email: &str) -> StoreResult<Vec<SelectionEntry>> {
        let data = self.inner.lock().await;
        Ok(data
            .selections
            .iter()
            .filter(|s| s.student_email == student_email)
            .cloned()
            .collect())
    }

    async fn delete_selection(&self, id: SelectionId, student_email: &str) -> StoreResult<bool> {
        let mut data = self.inner.lock().await;
        Ok(data.remove_selection(|s| s.id == id && s.student_email == student_email))
    }

    async fn find_enrollment_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        let data = self.inner.lock().await;
        Ok(data.enrollment_by_payment_ref(payment_ref).cloned())
    }

    async fn find_enrollment_for(
        &self,
        student_email: &str,
        course_id: CourseId,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        let data = self.inner.lock().await;
        Ok(data
            .enrollments
            .iter()
            .find(|e| e.student_email == student_email && e.course_id == course_id)
            .cloned())
    }

    async fn list_enrollments(&self, student_email: &str) -> StoreResult<Vec<EnrollmentRecord>> {
        let data = self.inner.lock().await;
        Ok(data
            .enrollments
            .iter()
            .rev()
            .filter(|e| e.student_email == student_email)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn EnrollmentTx>> {
        let guard = self.inner.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Collections>,
    staged: Collections,
}

#[async_trait]
impl EnrollmentTx for MemoryTx {
    async fn find_enrollment_by_payment_ref(
        &mut self,
        payment_ref: &str,
    ) -> StoreResult<Option<EnrollmentRecord>> {
        Ok(self.staged.enrollment_by_payment_ref(payment_ref).cloned())
    }

    async fn find_course(&mut self, id: CourseId) -> StoreResult<Option<Course>> {
        Ok(self.staged.course(id).cloned())
    }

    async fn find_selection(&mut self, id: SelectionId) -> StoreResult<Option<SelectionEntry>> {
        Ok(self.staged.selections.iter().find(|s| s.id == id).cloned())
    }

    async fn take_seat(&mut self, course_id: CourseId) -> StoreResult<Option<Course>> {
        Ok(self.staged.take_seat(course_id))
    }

    async fn insert_enrollment(
        &mut self,
        enrollment: &NewEnrollment,
    ) -> StoreResult<EnrollmentRecord> {
        self.staged.insert_enrollment(enrollment)
    }

    async fn delete_selection(&mut self, id: SelectionId) -> StoreResult<bool> {
        Ok(self.staged.remove_selection(|s| s.id == id))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_course(seats: i32) -> NewCourse {
        NewCourse {
            title: "Oil Portraits".to_string(),
            description: None,
            image_url: None,
            instructor_email: "painter@artistry.io".to_string(),
            instructor_name: Some("Painter".to_string()),
            price_cents: 12000,
            seats,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_student_then_updates() {
        let store = MemoryStore::new();
        let created = store
            .upsert_identity("ada@artistry.io", &IdentityUpsert::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.role, UserRole::Student);

        let updated = store
            .upsert_identity(
                "ada@artistry.io",
                &IdentityUpsert {
                    name: Some("Ada".to_string()),
                    role: Some(UserRole::Instructor),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.role, UserRole::Instructor);
        assert_eq!(updated.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_soft_deleted_identity_is_hidden_and_not_revived() {
        let store = MemoryStore::new();
        let identity = store
            .upsert_identity("gone@artistry.io", &IdentityUpsert::default())
            .await
            .unwrap()
            .unwrap();

        assert!(store.soft_delete_identity(identity.id).await.unwrap());
        assert!(!store.soft_delete_identity(identity.id).await.unwrap());
        assert!(
            store
                .find_identity_by_email("gone@artistry.io")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .upsert_identity("gone@artistry.io", &IdentityUpsert::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_transition_only_from_expected_status() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(5)).await.unwrap();

        let approved = store
            .transition_course_status(course.id, CourseStatus::Pending, CourseStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.unwrap().status, CourseStatus::Approved);

        let again = store
            .transition_course_status(course.id, CourseStatus::Pending, CourseStatus::Deny)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_selection_rejected() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(5)).await.unwrap();
        store
            .insert_selection("s@artistry.io", course.id)
            .await
            .unwrap();

        let err = store
            .insert_selection("s@artistry.io", course.id)
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_rolled_back_transaction_leaves_no_trace() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(1)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let taken = tx.take_seat(course.id).await.unwrap().unwrap();
        assert_eq!(taken.seats, 0);
        tx.rollback().await.unwrap();

        let after = store.find_course(course.id).await.unwrap().unwrap();
        assert_eq!(after.seats, 1);
        assert_eq!(after.enrolled_count, 0);
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(2)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.take_seat(course.id).await.unwrap();
        tx.insert_enrollment(&NewEnrollment {
            student_email: "s@artistry.io".to_string(),
            course_id: course.id,
            payment_ref: "pi_1".to_string(),
            amount_cents: 12000,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let after = store.find_course(course.id).await.unwrap().unwrap();
        assert_eq!(after.seats, 1);
        assert_eq!(after.enrolled_count, 1);
        assert!(
            store
                .find_enrollment_by_payment_ref("pi_1")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_one_enrollment_per_student_and_course() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(5)).await.unwrap();
        let first = NewEnrollment {
            student_email: "s@artistry.io".to_string(),
            course_id: course.id,
            payment_ref: "pi_1".to_string(),
            amount_cents: 12000,
        };

        let mut tx = store.begin().await.unwrap();
        tx.insert_enrollment(&first).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_enrollment(&NewEnrollment {
                payment_ref: "pi_2".to_string(),
                ..first.clone()
            })
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(COURSE_ENROLLMENT));

        let err = tx
            .insert_enrollment(&NewEnrollment {
                student_email: "other@artistry.io".to_string(),
                ..first
            })
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(PAYMENT_REF));
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_take_seat_never_goes_negative() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(0)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.take_seat(course.id).await.unwrap().is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_course_blocked_by_enrollment() {
        let store = MemoryStore::new();
        let course = store.insert_course(&new_course(3)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.take_seat(course.id).await.unwrap();
        tx.commit().await.unwrap();

        assert!(
            !store
                .delete_course(course.id, "painter@artistry.io")
                .await
                .unwrap()
        );
    }
}
