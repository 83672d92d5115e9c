use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    approve_course, create_course, delete_course, deny_course, get_course, list_all_courses,
    list_courses, list_my_courses, set_course_feedback, update_course,
};

/// Public catalogue plus the instructor-only delete, which shares its path
/// with the public detail route.
pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/classes", get(list_courses))
        .route("/classes/{id}", get(get_course).delete(delete_course))
}

/// Moderation routes; mount behind `require_admin`.
pub fn init_course_moderation_router() -> Router<AppState> {
    Router::new()
        .route("/classes/all", get(list_all_courses))
        .route("/classes/approved/{id}", patch(approve_course))
        .route("/classes/deny/{id}", patch(deny_course))
        .route("/classes/feedback/{id}", patch(set_course_feedback))
}

/// Authoring routes; mount behind `require_instructor`.
pub fn init_instructor_courses_router() -> Router<AppState> {
    Router::new()
        .route("/class", post(create_course))
        .route("/my-classes", get(list_my_courses))
        .route("/update-class/{id}", patch(update_course))
}
