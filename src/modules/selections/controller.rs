use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{SelectCourseDto, SelectionEntry, SelectionId};

use crate::middleware::role::CurrentIdentity;
use crate::modules::selections::service::SelectionService;
use crate::state::AppState;
use crate::validator::{ValidPath, ValidatedJson};

#[utoipa::path(
    get,
    path = "/select-class",
    responses(
        (status = 200, description = "The caller's selected courses", body = Vec<SelectionEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only")
    ),
    tag = "Selections",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_selections(
    State(state): State<AppState>,
    CurrentIdentity(student): CurrentIdentity,
) -> Result<ApiResponse<Vec<SelectionEntry>>, AppError> {
    let selections =
        SelectionService::list_selections(state.store.as_ref(), &student.email).await?;

    Ok(ApiResponse::list("Selections retrieved", selections))
}

#[utoipa::path(
    post,
    path = "/select-class",
    request_body = SelectCourseDto,
    responses(
        (status = 201, description = "Course selected", body = SelectionEntry),
        (status = 400, description = "Already selected or already enrolled"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only, or studentEmail is not the caller"),
        (status = 404, description = "Course not found or not approved"),
        (status = 409, description = "No seats available")
    ),
    tag = "Selections",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn select_course(
    State(state): State<AppState>,
    CurrentIdentity(student): CurrentIdentity,
    ValidatedJson(dto): ValidatedJson<SelectCourseDto>,
) -> Result<ApiResponse<SelectionEntry>, AppError> {
    let selection = SelectionService::select_course(state.store.as_ref(), &student, dto).await?;

    Ok(ApiResponse::created("Course selected", selection))
}

#[utoipa::path(
    delete,
    path = "/select-class/{id}",
    params(
        ("id" = String, Path, description = "Selection ID (UUID)")
    ),
    responses(
        (status = 200, description = "Selection removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - student only"),
        (status = 404, description = "Selection not found")
    ),
    tag = "Selections",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_selection(
    State(state): State<AppState>,
    CurrentIdentity(student): CurrentIdentity,
    ValidPath(id): ValidPath<SelectionId>,
) -> Result<ApiResponse<()>, AppError> {
    SelectionService::remove_selection(state.store.as_ref(), id, &student.email).await?;

    Ok(ApiResponse::message("Selection removed"))
}
