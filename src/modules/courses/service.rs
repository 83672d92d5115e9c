//! Course catalogue and the approval workflow.
//!
//! New courses start `pending`. An admin moves them to `approved` or `deny`
//! exactly once; both are terminal. Only approved courses are public.

use tracing::instrument;

use artistry_core::AppError;
use artistry_db::Store;
use artistry_models::{
    Course, CourseChanges, CourseFilter, CourseId, CourseStatus, CreateCourseDto, Identity,
    NewCourse, UpdateCourseDto,
};

use crate::audit_event;
use crate::metrics::{track_course_created, track_course_moderated};

pub struct CourseService;

impl CourseService {
    /// Approved courses and their total count.
    #[instrument(skip(store))]
    pub async fn list_approved(store: &dyn Store) -> Result<(Vec<Course>, i64), AppError> {
        let filter = CourseFilter::approved();
        let courses = store.list_courses(&filter).await?;
        let total = store.count_courses(&filter).await?;
        Ok((courses, total))
    }

    #[instrument(skip(store))]
    pub async fn list_all(
        store: &dyn Store,
        status: Option<CourseStatus>,
    ) -> Result<Vec<Course>, AppError> {
        let filter = CourseFilter {
            status,
            ..Default::default()
        };
        Ok(store.list_courses(&filter).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_approved(store: &dyn Store, id: CourseId) -> Result<Course, AppError> {
        store
            .find_course(id)
            .await?
            .filter(|course| course.status == CourseStatus::Approved)
            .ok_or_else(|| AppError::not_found("Course not found"))
    }

    #[instrument(skip(store))]
    pub async fn create_course(
        store: &dyn Store,
        instructor: &Identity,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        let new_course = NewCourse {
            title: dto.title,
            description: dto.description,
            image_url: dto.image_url,
            instructor_email: instructor.email.clone(),
            instructor_name: instructor.name.clone(),
            price_cents: dto.price_cents,
            seats: dto.seats,
        };

        let course = store.insert_course(&new_course).await?;
        track_course_created();

        Ok(course)
    }

    #[instrument(skip(store))]
    pub async fn list_for_instructor(
        store: &dyn Store,
        instructor_email: &str,
    ) -> Result<Vec<Course>, AppError> {
        let filter = CourseFilter {
            instructor_email: Some(instructor_email.to_string()),
            ..Default::default()
        };
        Ok(store.list_courses(&filter).await?)
    }

    /// Edits one of the instructor's own courses.
    #[instrument(skip(store))]
    pub async fn update_course(
        store: &dyn Store,
        id: CourseId,
        instructor_email: &str,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        store
            .update_course(id, instructor_email, &CourseChanges::from(dto))
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))
    }

    /// Deletes one of the instructor's own courses while nobody is enrolled.
    #[instrument(skip(store))]
    pub async fn delete_course(
        store: &dyn Store,
        id: CourseId,
        instructor_email: &str,
    ) -> Result<(), AppError> {
        let course = store
            .find_course(id)
            .await?
            .filter(|course| course.instructor_email == instructor_email)
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        if course.enrolled_count > 0 {
            return Err(AppError::update_failed(
                "Course has enrolled students and cannot be deleted",
            ));
        }

        if !store.delete_course(id, instructor_email).await? {
            return Err(AppError::update_failed("Course could not be deleted"));
        }

        Ok(())
    }

    /// Moves a pending course to `to`.
    #[instrument(skip(store))]
    pub async fn moderate(
        store: &dyn Store,
        admin: &Identity,
        id: CourseId,
        to: CourseStatus,
    ) -> Result<Course, AppError> {
        if !CourseStatus::Pending.can_transition_to(to) {
            return Err(AppError::bad_request(format!("Courses cannot be moved to {}", to)));
        }

        let Some(course) = store
            .transition_course_status(id, CourseStatus::Pending, to)
            .await?
        else {
            return match store.find_course(id).await? {
                None => Err(AppError::not_found("Course not found")),
                Some(current) => Err(AppError::update_failed(format!(
                    "Course is already {}",
                    current.status
                ))),
            };
        };

        track_course_moderated(to.as_str());
        audit_event!(
            "course_moderated",
            "course",
            course.id = %course.id,
            status = %to,
            actor = %admin.email
        );

        Ok(course)
    }

    #[instrument(skip(store))]
    pub async fn set_feedback(
        store: &dyn Store,
        id: CourseId,
        feedback: &str,
    ) -> Result<Course, AppError> {
        store
            .set_course_feedback(id, feedback)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artistry_core::ErrorKind;
    use artistry_db::MemoryStore;
    use artistry_models::{IdentityUpsert, UserRole};

    async fn identity(store: &MemoryStore, email: &str, role: UserRole) -> Identity {
        store
            .upsert_identity(
                email,
                &IdentityUpsert {
                    name: Some("Frida".to_string()),
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    fn course_dto(seats: i32) -> CreateCourseDto {
        CreateCourseDto {
            title: "Oil Portraits".to_string(),
            description: Some("Layering and glazing".to_string()),
            image_url: None,
            price_cents: 12000,
            seats,
        }
    }

    #[tokio::test]
    async fn test_new_course_is_pending_and_hidden() {
        let store = MemoryStore::new();
        let instructor = identity(&store, "frida@x.io", UserRole::Instructor).await;

        let course = CourseService::create_course(&store, &instructor, course_dto(10))
            .await
            .unwrap();
        assert_eq!(course.status, CourseStatus::Pending);
        assert_eq!(course.instructor_email, "frida@x.io");
        assert_eq!(course.instructor_name.as_deref(), Some("Frida"));

        let (approved, total) = CourseService::list_approved(&store).await.unwrap();
        assert!(approved.is_empty());
        assert_eq!(total, 0);

        let err = CourseService::get_approved(&store, course.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_approval_is_terminal() {
        let store = MemoryStore::new();
        let instructor = identity(&store, "frida@x.io", UserRole::Instructor).await;
        let admin = identity(&store, "admin@x.io", UserRole::Admin).await;
        let course = CourseService::create_course(&store, &instructor, course_dto(10))
            .await
            .unwrap();

        let approved = CourseService::moderate(&store, &admin, course.id, CourseStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, CourseStatus::Approved);

        let err = CourseService::moderate(&store, &admin, course.id, CourseStatus::Deny)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpdateFailed);

        let (listed, total) = CourseService::list_approved(&store).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_moderate_missing_course() {
        let store = MemoryStore::new();
        let admin = identity(&store, "admin@x.io", UserRole::Admin).await;

        let err = CourseService::moderate(&store, &admin, CourseId::new(), CourseStatus::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_moderate_back_to_pending_rejected() {
        let store = MemoryStore::new();
        let admin = identity(&store, "admin@x.io", UserRole::Admin).await;

        let err = CourseService::moderate(&store, &admin, CourseId::new(), CourseStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_update_only_own_course() {
        let store = MemoryStore::new();
        let instructor = identity(&store, "frida@x.io", UserRole::Instructor).await;
        let course = CourseService::create_course(&store, &instructor, course_dto(10))
            .await
            .unwrap();

        let dto = UpdateCourseDto {
            title: Some("Oil Portraits II".to_string()),
            ..Default::default()
        };
        let err = CourseService::update_course(&store, course.id, "diego@x.io", dto.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let updated = CourseService::update_course(&store, course.id, "frida@x.io", dto)
            .await
            .unwrap();
        assert_eq!(updated.title, "Oil Portraits II");
        assert_eq!(updated.price_cents, 12000);
    }

    #[tokio::test]
    async fn test_delete_own_course() {
        let store = MemoryStore::new();
        let instructor = identity(&store, "frida@x.io", UserRole::Instructor).await;
        let course = CourseService::create_course(&store, &instructor, course_dto(10))
            .await
            .unwrap();

        let err = CourseService::delete_course(&store, course.id, "diego@x.io")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        CourseService::delete_course(&store, course.id, "frida@x.io")
            .await
            .unwrap();
        assert!(store.find_course(course.id).await.unwrap().is_none());
    }
}
