use axum::extract::State;
use tracing::instrument;

use artistry_core::{ApiResponse, AppError};
use artistry_models::{TokenRequest, TokenResponse};

use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed credential", body = TokenResponse),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Invalid email")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn issue_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<TokenRequest>,
) -> Result<ApiResponse<TokenResponse>, AppError> {
    let token = AuthService::issue_token(&dto.email, &state.jwt_config)?;

    Ok(ApiResponse::ok("Token issued", token))
}
