use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use artistry_core::{ErrorKind, ErrorResponse};
use artistry_models::{
    AdminFlag, CompletePaymentDto, Course, CourseFeedbackDto, CourseStatus, CreateCourseDto,
    CreatePaymentIntentDto, EnrollmentReceipt, EnrollmentRecord, Identity, InstructorFlag,
    PaymentIntentResponse, SelectCourseDto, SelectionEntry, TokenRequest, TokenResponse,
    UpdateCourseDto, UpsertIdentityDto, UserRole,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::root,
        crate::modules::health::health,
        crate::modules::auth::controller::issue_token,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::list_instructors,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::upsert_user,
        crate::modules::users::controller::check_admin,
        crate::modules::users::controller::check_instructor,
        crate::modules::users::controller::make_admin,
        crate::modules::users::controller::make_instructor,
        crate::modules::users::controller::delete_user,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::list_all_courses,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::list_my_courses,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::approve_course,
        crate::modules::courses::controller::deny_course,
        crate::modules::courses::controller::set_course_feedback,
        crate::modules::selections::controller::list_selections,
        crate::modules::selections::controller::select_course,
        crate::modules::selections::controller::remove_selection,
        crate::modules::enrollments::controller::list_enrollments,
        crate::modules::enrollments::controller::complete_payment,
        crate::modules::payments::controller::create_payment_intent,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorKind,
            TokenRequest,
            TokenResponse,
            Identity,
            UserRole,
            UpsertIdentityDto,
            AdminFlag,
            InstructorFlag,
            Course,
            CourseStatus,
            CreateCourseDto,
            UpdateCourseDto,
            CourseFeedbackDto,
            SelectionEntry,
            SelectCourseDto,
            EnrollmentRecord,
            EnrollmentReceipt,
            CompletePaymentDto,
            CreatePaymentIntentDto,
            PaymentIntentResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Authentication", description = "Credential issuance"),
        (name = "Users", description = "Identities and roles"),
        (name = "Courses", description = "Course catalogue and instructor authoring"),
        (name = "Course Moderation", description = "Admin approval workflow"),
        (name = "Selections", description = "Courses a student intends to buy"),
        (name = "Enrollments", description = "Paid enrollments"),
        (name = "Payments", description = "Payment processor intents")
    ),
    info(
        title = "Artistry Academia API",
        version = "0.1.0",
        description = "Course marketplace backend: instructors publish art courses, admins approve them, students select, pay for and enroll in them.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
