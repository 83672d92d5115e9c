use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{AdminFlag, Identity, IdentityId, InstructorFlag, UpsertIdentityDto, UserRole};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::{ValidPath, ValidatedJson};

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All live identities", body = Vec<Identity>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<ApiResponse<Vec<Identity>>, AppError> {
    let users = UserService::list_users(state.store.as_ref()).await?;

    Ok(ApiResponse::list("Users retrieved", users))
}

#[utoipa::path(
    get,
    path = "/instructors",
    responses(
        (status = 200, description = "Identities with the instructor role", body = Vec<Identity>)
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn list_instructors(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Identity>>, AppError> {
    let instructors = UserService::list_instructors(state.store.as_ref()).await?;

    Ok(ApiResponse::list("Instructors retrieved", instructors))
}

#[utoipa::path(
    get,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Identity email")
    ),
    responses(
        (status = 200, description = "Identity", body = Identity),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidPath(email): ValidPath<String>,
) -> Result<ApiResponse<Identity>, AppError> {
    let user = UserService::get_user_by_email(state.store.as_ref(), &email).await?;

    Ok(ApiResponse::ok("User retrieved", user))
}

#[utoipa::path(
    put,
    path = "/users/{email}",
    params(
        ("email" = String, Path, description = "Identity email")
    ),
    request_body = UpsertIdentityDto,
    responses(
        (status = 200, description = "Identity created or updated", body = Identity),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the caller's identity, or a role change by a non-admin"),
        (status = 404, description = "Identity was deleted")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn upsert_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidPath(email): ValidPath<String>,
    ValidatedJson(dto): ValidatedJson<UpsertIdentityDto>,
) -> Result<ApiResponse<Identity>, AppError> {
    let user =
        UserService::upsert_user(state.store.as_ref(), auth_user.email(), &email, dto).await?;

    Ok(ApiResponse::ok("User saved", user))
}

#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(
        ("email" = String, Path, description = "Identity email")
    ),
    responses(
        (status = 200, description = "Whether the caller is an admin", body = AdminFlag),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn check_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidPath(email): ValidPath<String>,
) -> Result<ApiResponse<AdminFlag>, AppError> {
    let flag = UserService::is_admin(state.store.as_ref(), auth_user.email(), &email).await?;

    Ok(ApiResponse::ok("Admin status retrieved", flag))
}

#[utoipa::path(
    get,
    path = "/users/instructor/{email}",
    params(
        ("email" = String, Path, description = "Identity email")
    ),
    responses(
        (status = 200, description = "Whether the caller is an instructor", body = InstructorFlag),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn check_instructor(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidPath(email): ValidPath<String>,
) -> Result<ApiResponse<InstructorFlag>, AppError> {
    let flag =
        UserService::is_instructor(state.store.as_ref(), auth_user.email(), &email).await?;

    Ok(ApiResponse::ok("Instructor status retrieved", flag))
}

#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(
        ("id" = String, Path, description = "Identity ID (UUID)")
    ),
    responses(
        (status = 200, description = "Identity promoted to admin", body = Identity),
        (status = 400, description = "Invalid ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn make_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidPath(id): ValidPath<IdentityId>,
) -> Result<ApiResponse<Identity>, AppError> {
    let user = UserService::set_role(state.store.as_ref(), &admin, id, UserRole::Admin).await?;

    Ok(ApiResponse::ok("User is now an admin", user))
}

#[utoipa::path(
    patch,
    path = "/users/instructor/{id}",
    params(
        ("id" = String, Path, description = "Identity ID (UUID)")
    ),
    responses(
        (status = 200, description = "Identity promoted to instructor", body = Identity),
        (status = 400, description = "Invalid ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn make_instructor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidPath(id): ValidPath<IdentityId>,
) -> Result<ApiResponse<Identity>, AppError> {
    let user =
        UserService::set_role(state.store.as_ref(), &admin, id, UserRole::Instructor).await?;

    Ok(ApiResponse::ok("User is now an instructor", user))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "Identity ID (UUID)")
    ),
    responses(
        (status = 200, description = "Identity soft-deleted"),
        (status = 400, description = "Invalid ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidPath(id): ValidPath<IdentityId>,
) -> Result<ApiResponse<()>, AppError> {
    UserService::delete_user(state.store.as_ref(), &admin, id).await?;

    Ok(ApiResponse::message("User deleted"))
}
