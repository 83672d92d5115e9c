use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{
    Course, CourseFeedbackDto, CourseId, CourseStatus, CourseStatusQuery, CreateCourseDto,
    UpdateCourseDto,
};

use crate::middleware::role::{CurrentIdentity, RequireInstructor};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::validator::{ValidPath, ValidQuery, ValidatedJson};

#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Approved courses, newest first", body = Vec<Course>)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Course>>, AppError> {
    let (courses, total) = CourseService::list_approved(state.store.as_ref()).await?;

    Ok(ApiResponse::ok("Courses retrieved", courses).with_total(total))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    responses(
        (status = 200, description = "Approved course", body = Course),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<CourseId>,
) -> Result<ApiResponse<Course>, AppError> {
    let course = CourseService::get_approved(state.store.as_ref(), id).await?;

    Ok(ApiResponse::ok("Course retrieved", course))
}

#[utoipa::path(
    get,
    path = "/classes/all",
    params(CourseStatusQuery),
    responses(
        (status = 200, description = "Every course, optionally filtered by status", body = Vec<Course>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_courses(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<CourseStatusQuery>,
) -> Result<ApiResponse<Vec<Course>>, AppError> {
    let courses = CourseService::list_all(state.store.as_ref(), query.status).await?;

    Ok(ApiResponse::list("Courses retrieved", courses))
}

#[utoipa::path(
    post,
    path = "/class",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created as pending", body = Course),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - instructor only"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    CurrentIdentity(instructor): CurrentIdentity,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<ApiResponse<Course>, AppError> {
    let course = CourseService::create_course(state.store.as_ref(), &instructor, dto).await?;

    Ok(ApiResponse::created("Course submitted for review", course))
}

#[utoipa::path(
    get,
    path = "/my-classes",
    responses(
        (status = 200, description = "The caller's courses in every status", body = Vec<Course>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - instructor only")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_my_courses(
    State(state): State<AppState>,
    CurrentIdentity(instructor): CurrentIdentity,
) -> Result<ApiResponse<Vec<Course>>, AppError> {
    let courses =
        CourseService::list_for_instructor(state.store.as_ref(), &instructor.email).await?;

    Ok(ApiResponse::list("Courses retrieved", courses))
}

#[utoipa::path(
    patch,
    path = "/update-class/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - instructor only"),
        (status = 404, description = "Course not found or not owned by the caller"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course(
    State(state): State<AppState>,
    CurrentIdentity(instructor): CurrentIdentity,
    ValidPath(id): ValidPath<CourseId>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<ApiResponse<Course>, AppError> {
    let course =
        CourseService::update_course(state.store.as_ref(), id, &instructor.email, dto).await?;

    Ok(ApiResponse::ok("Course updated", course))
}

#[utoipa::path(
    delete,
    path = "/classes/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - instructor only"),
        (status = 404, description = "Course not found or not owned by the caller"),
        (status = 409, description = "Students are enrolled")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequireInstructor(instructor): RequireInstructor,
    ValidPath(id): ValidPath<CourseId>,
) -> Result<ApiResponse<()>, AppError> {
    CourseService::delete_course(state.store.as_ref(), id, &instructor.email).await?;

    Ok(ApiResponse::message("Course deleted"))
}

#[utoipa::path(
    patch,
    path = "/classes/approved/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    responses(
        (status = 200, description = "Course approved", body = Course),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course is not pending")
    ),
    tag = "Course Moderation",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_course(
    State(state): State<AppState>,
    CurrentIdentity(admin): CurrentIdentity,
    ValidPath(id): ValidPath<CourseId>,
) -> Result<ApiResponse<Course>, AppError> {
    let course =
        CourseService::moderate(state.store.as_ref(), &admin, id, CourseStatus::Approved).await?;

    Ok(ApiResponse::ok("Course approved", course))
}

#[utoipa::path(
    patch,
    path = "/classes/deny/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    responses(
        (status = 200, description = "Course denied", body = Course),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course is not pending")
    ),
    tag = "Course Moderation",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deny_course(
    State(state): State<AppState>,
    CurrentIdentity(admin): CurrentIdentity,
    ValidPath(id): ValidPath<CourseId>,
) -> Result<ApiResponse<Course>, AppError> {
    let course =
        CourseService::moderate(state.store.as_ref(), &admin, id, CourseStatus::Deny).await?;

    Ok(ApiResponse::ok("Course denied", course))
}

#[utoipa::path(
    patch,
    path = "/classes/feedback/{id}",
    params(
        ("id" = String, Path, description = "Course ID (UUID)")
    ),
    request_body = CourseFeedbackDto,
    responses(
        (status = 200, description = "Feedback saved", body = Course),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Course Moderation",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn set_course_feedback(
    State(state): State<AppState>,
    CurrentIdentity(_admin): CurrentIdentity,
    ValidPath(id): ValidPath<CourseId>,
    ValidatedJson(dto): ValidatedJson<CourseFeedbackDto>,
) -> Result<ApiResponse<Course>, AppError> {
    let course = CourseService::set_feedback(state.store.as_ref(), id, &dto.feedback).await?;

    Ok(ApiResponse::ok("Feedback saved", course))
}
