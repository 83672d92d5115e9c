use tracing::instrument;

use artistry_core::AppError;
use artistry_db::Store;
use artistry_models::{CourseStatus, Identity, SelectCourseDto, SelectionEntry, SelectionId};

use crate::metrics::track_selection_created;

pub struct SelectionService;

impl SelectionService {
    #[instrument(skip(store))]
    pub async fn list_selections(
        store: &dyn Store,
        student_email: &str,
    ) -> Result<Vec<SelectionEntry>, AppError> {
        Ok(store.list_selections(student_email).await?)
    }

    /// Adds an approved course with a free seat to the student's selections.
    /// A course the student is enrolled in or has already selected is refused.
    #[instrument(skip(store))]
    pub async fn select_course(
        store: &dyn Store,
        student: &Identity,
        dto: SelectCourseDto,
    ) -> Result<SelectionEntry, AppError> {
        if let Some(email) = dto.student_email.as_deref()
            && email != student.email
        {
            return Err(AppError::forbidden(
                "studentEmail must match the authenticated user",
            ));
        }

        let course = store
            .find_course(dto.course_id)
            .await?
            .filter(|course| course.status == CourseStatus::Approved)
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        if store
            .find_enrollment_for(&student.email, course.id)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request("Already enrolled in this course"));
        }

        if store
            .find_selection_for(&student.email, course.id)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request("Course is already selected"));
        }

        if course.seats <= 0 {
            return Err(AppError::update_failed("No seats available"));
        }

        let selection = store
            .insert_selection(&student.email, course.id)
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    AppError::bad_request("Course is already selected")
                } else {
                    AppError::from(e)
                }
            })?;

        track_selection_created();

        Ok(selection)
    }

    #[instrument(skip(store))]
    pub async fn remove_selection(
        store: &dyn Store,
        id: SelectionId,
        student_email: &str,
    ) -> Result<(), AppError> {
        if !store.delete_selection(id, student_email).await? {
            return Err(AppError::not_found("Selection not found"));
        }

        Ok(())
    }
}
